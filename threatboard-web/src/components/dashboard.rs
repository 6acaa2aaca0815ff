use crate::api::{self, FetchState};
use crate::app::Generation;
use crate::components::{pending_view, SessionTable};
use anyhow::Error;
use threatboard::models::{Health, IocStats, IocType, SessionPage, SessionQuery};
use yew::context::ContextHandle;
use yew::prelude::*;

const RECENT_SESSIONS: u32 = 5;

pub enum Msg {
    Load,
    HealthLoaded(Result<Health, Error>),
    StatsLoaded(Result<IocStats, Error>),
    SessionsLoaded(Result<SessionPage, Error>),
}

pub struct Dashboard {
    health: FetchState<Health>,
    stats: FetchState<IocStats>,
    sessions: FetchState<SessionPage>,
    _handle: Option<ContextHandle<Generation>>,
}

impl Component for Dashboard {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let handle = ctx
            .link()
            .context::<Generation>(ctx.link().callback(|_| Msg::Load))
            .map(|(_, handle)| handle);
        ctx.link().send_message(Msg::Load);
        Self {
            health: FetchState::NotStarted,
            stats: FetchState::NotStarted,
            sessions: FetchState::NotStarted,
            _handle: handle,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Load => {
                self.health = FetchState::Fetching;
                self.stats = FetchState::Fetching;
                self.sessions = FetchState::Fetching;
                api::health_check(ctx, Msg::HealthLoaded);
                api::get_ioc_stats(ctx, Msg::StatsLoaded);
                let query = SessionQuery {
                    page: Some(1),
                    per_page: Some(RECENT_SESSIONS),
                };
                api::get_sessions(query, ctx, Msg::SessionsLoaded);
            }
            Msg::HealthLoaded(result) => self.health = result.into(),
            Msg::StatsLoaded(result) => self.stats = result.into(),
            Msg::SessionsLoaded(result) => self.sessions = result.into(),
        }
        true
    }

    fn view(&self, _ctx: &Context<Self>) -> Html {
        let health = match &self.health {
            FetchState::Success(health) => html! {
                <p class={classes!("health", health.status.clone())}>{"Backend: "}{&health.status}</p>
            },
            other => pending_view(other).unwrap_or_default(),
        };
        let stats = match &self.stats {
            FetchState::Success(stats) => {
                let per_type: Vec<Html> = IocType::ALL
                    .iter()
                    .map(|t| {
                        html! {
                            <div class="stat">
                                <span class="count">{stats.count(*t)}</span>
                                <span class="label">{t.as_str()}</span>
                            </div>
                        }
                    })
                    .collect();
                html! {
                    <>
                        <div class="stats">
                            <div class="stat">
                                <span class="count">{stats.total}</span>
                                <span class="label">{"total"}</span>
                            </div>
                            <div class="stat">
                                <span class="count">{stats.recent}</span>
                                <span class="label">{"last 24h"}</span>
                            </div>
                        </div>
                        <div class="stats">{per_type}</div>
                    </>
                }
            }
            other => pending_view(other).unwrap_or_default(),
        };
        let sessions = match &self.sessions {
            FetchState::Success(page) => html! {<SessionTable sessions={page.sessions.clone()} />},
            other => pending_view(other).unwrap_or_default(),
        };
        html! {
            <>
                <div class="card">{health}</div>
                <div class="card">
                    <h2>{"Indicators"}</h2>
                    {stats}
                </div>
                <div class="card">
                    <h2>{"Recent Sessions"}</h2>
                    {sessions}
                </div>
            </>
        }
    }
}
