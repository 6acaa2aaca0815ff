use crate::api::{self, FetchState};
use anyhow::Error;
use threatboard::models::Health;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct Props {
    /// Receives the backend status after a successful health check.
    pub callback: Callback<String>,
}

pub struct RefreshButton {
    fetch_state: FetchState<Health>,
}

pub enum Msg {
    Refresh,
    Success(Health),
    Failure(Error),
}

impl Component for RefreshButton {
    type Message = Msg;
    type Properties = Props;

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            fetch_state: FetchState::NotStarted,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Success(health) => {
                ctx.props().callback.emit(health.status.clone());
                self.fetch_state = FetchState::Success(health);
                true
            }
            Msg::Failure(err) => {
                self.fetch_state = FetchState::Failed(err);
                true
            }
            Msg::Refresh => {
                self.fetch_state = FetchState::Fetching;
                api::health_check(ctx, |result| match result {
                    Ok(health) => Msg::Success(health),
                    Err(err) => Msg::Failure(err),
                });
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let onclick = ctx.link().callback(|_| Msg::Refresh);
        let class = match self.fetch_state {
            FetchState::Failed(_) => "offline",
            FetchState::Fetching => "busy",
            _ => "",
        };
        let title = match &self.fetch_state {
            FetchState::Failed(err) => err.to_string(),
            _ => String::new(),
        };
        html! {
            <span id={"refresh"} {class} {title} {onclick}>{"Refresh"}</span>
        }
    }
}
