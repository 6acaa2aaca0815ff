use crate::api::{self, FetchState};
use crate::components::{pending_view, IocTable, SessionTable};
use anyhow::Error;
use threatboard::models::ScrapeResult;
use web_sys::HtmlInputElement;
use yew::prelude::*;

pub enum Msg {
    SetUrl(String),
    SetIncludePrivateIps(bool),
    Submit,
    Done(Result<ScrapeResult, Error>),
}

/// One-off scrape of a URL that is not a configured source.
pub struct AdHocScrape {
    url: String,
    include_private_ips: bool,
    result: FetchState<ScrapeResult>,
}

impl Component for AdHocScrape {
    type Message = Msg;
    type Properties = ();

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            url: String::new(),
            include_private_ips: false,
            result: FetchState::NotStarted,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::SetUrl(url) => {
                self.url = url;
                false
            }
            Msg::SetIncludePrivateIps(include) => {
                self.include_private_ips = include;
                false
            }
            Msg::Submit => {
                if matches!(self.result, FetchState::Fetching) {
                    return false;
                }
                self.result = FetchState::Fetching;
                let url = self.url.trim().to_string();
                api::scrape_adhoc(url, self.include_private_ips, ctx, Msg::Done);
                true
            }
            Msg::Done(result) => {
                self.result = result.into();
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let onsubmit = link.callback(|e: SubmitEvent| {
            e.prevent_default();
            Msg::Submit
        });
        let oninput = link.callback(|e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            Msg::SetUrl(input.value())
        });
        let onchange = link.callback(|e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            Msg::SetIncludePrivateIps(input.checked())
        });
        let result = match &self.result {
            FetchState::NotStarted => html! {},
            FetchState::Success(result) => {
                let iocs = result.iocs.clone().unwrap_or_default();
                html! {
                    <>
                        <SessionTable sessions={vec![result.session.clone()]} />
                        <IocTable {iocs} />
                    </>
                }
            }
            other => pending_view(other).unwrap_or_default(),
        };
        html! {
            <>
                <div class="card">
                    <form class="scrape-form" {onsubmit}>
                        <input type="url" placeholder="https://blog.example/report" required=true
                            value={self.url.clone()} {oninput} />
                        <label>
                            <input type="checkbox" checked={self.include_private_ips} {onchange} />
                            {"Include private IPs"}
                        </label>
                        <button type="submit">{"Scrape"}</button>
                    </form>
                </div>
                <div class="card">{result}</div>
            </>
        }
    }
}
