use crate::api::{self, FetchState};
use crate::app::Generation;
use crate::components::{format_optional_time, pending_view};
use anyhow::Error;
use threatboard::models::{NewSource, ScrapeResult, Source, SourceUpdate, DEFAULT_SCRAPE_INTERVAL};
use web_sys::HtmlInputElement;
use yew::context::ContextHandle;
use yew::prelude::*;

pub enum Msg {
    Load,
    Loaded(Result<Vec<Source>, Error>),
    SetUrl(String),
    SetName(String),
    SetDescription(String),
    SetInterval(String),
    SetActive(bool),
    Create,
    Created(Result<Source, Error>),
    Toggle(u64, bool),
    Updated(Result<Source, Error>),
    Delete(u64),
    Deleted(u64, Result<(), Error>),
    Scrape(u64),
    Scraped(Result<ScrapeResult, Error>),
}

struct Draft {
    url: String,
    name: String,
    description: String,
    interval: String,
    active: bool,
}

impl Default for Draft {
    fn default() -> Self {
        Draft {
            url: String::new(),
            name: String::new(),
            description: String::new(),
            interval: DEFAULT_SCRAPE_INTERVAL.to_string(),
            active: true,
        }
    }
}

pub struct Sources {
    sources: FetchState<Vec<Source>>,
    draft: Draft,
    notice: Option<Result<String, String>>,
    _handle: Option<ContextHandle<Generation>>,
}

fn input_value(e: InputEvent) -> String {
    let input: HtmlInputElement = e.target_unchecked_into();
    input.value()
}

impl Sources {
    fn reload(&mut self, ctx: &Context<Self>) {
        self.sources = FetchState::Fetching;
        api::get_sources(ctx, Msg::Loaded);
    }

    fn form(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let onsubmit = link.callback(|e: SubmitEvent| {
            e.prevent_default();
            Msg::Create
        });
        let onchange_active = link.callback(|e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            Msg::SetActive(input.checked())
        });
        html! {
            <form class="source-form" {onsubmit}>
                <input type="url" placeholder="https://feed.example/iocs.txt" required=true
                    value={self.draft.url.clone()}
                    oninput={link.callback(|e| Msg::SetUrl(input_value(e)))} />
                <input type="text" placeholder="Name"
                    value={self.draft.name.clone()}
                    oninput={link.callback(|e| Msg::SetName(input_value(e)))} />
                <input type="text" placeholder="Description"
                    value={self.draft.description.clone()}
                    oninput={link.callback(|e| Msg::SetDescription(input_value(e)))} />
                <input type="number" min="60" title="Scrape interval in seconds"
                    value={self.draft.interval.clone()}
                    oninput={link.callback(|e| Msg::SetInterval(input_value(e)))} />
                <label>
                    <input type="checkbox" checked={self.draft.active} onchange={onchange_active} />
                    {"Active"}
                </label>
                <button type="submit">{"Add Source"}</button>
            </form>
        }
    }

    fn table(&self, ctx: &Context<Self>, sources: &[Source]) -> Html {
        if sources.is_empty() {
            return html! {<p class="empty">{"No sources configured."}</p>};
        }
        let link = ctx.link();
        let rows: Vec<Html> = sources
            .iter()
            .map(|source| {
                let id = source.id;
                let active = source.active;
                html! {
                    <tr class={classes!((!active).then_some("inactive"))}>
                        <td class={"left"}>
                            <span class="name">{source.name.as_deref().unwrap_or_default()}</span>
                            <a class="mono" href={source.url.clone()} target="_blank">{&source.url}</a>
                        </td>
                        <td class={"left"}>{source.description.as_deref().unwrap_or_default()}</td>
                        <td class={"right"}>{format!("{}s", source.scrape_interval)}</td>
                        <td class={"mono right"}>{format_optional_time(&source.last_scraped)}</td>
                        <td class={"right actions"}>
                            <button onclick={link.callback(move |_| Msg::Toggle(id, !active))}>
                                {if active { "Disable" } else { "Enable" }}
                            </button>
                            <button onclick={link.callback(move |_| Msg::Scrape(id))}>{"Scrape"}</button>
                            <button class="danger" onclick={link.callback(move |_| Msg::Delete(id))}>{"Delete"}</button>
                        </td>
                    </tr>
                }
            })
            .collect();
        html! {
            <table class={"sources"}>
                <tr>
                    <th class={"left"}>{"Source"}</th>
                    <th class={"left"}>{"Description"}</th>
                    <th class={"right"}>{"Interval"}</th>
                    <th class={"right"}>{"Last Scraped"}</th>
                    <th></th>
                </tr>
                {rows}
            </table>
        }
    }
}

impl Component for Sources {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let handle = ctx
            .link()
            .context::<Generation>(ctx.link().callback(|_| Msg::Load))
            .map(|(_, handle)| handle);
        ctx.link().send_message(Msg::Load);
        Self {
            sources: FetchState::NotStarted,
            draft: Draft::default(),
            notice: None,
            _handle: handle,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Load => self.reload(ctx),
            Msg::Loaded(result) => self.sources = result.into(),
            Msg::SetUrl(url) => self.draft.url = url,
            Msg::SetName(name) => self.draft.name = name,
            Msg::SetDescription(description) => self.draft.description = description,
            Msg::SetInterval(interval) => self.draft.interval = interval,
            Msg::SetActive(active) => self.draft.active = active,
            Msg::Create => {
                let Ok(scrape_interval) = self.draft.interval.trim().parse::<u32>() else {
                    self.notice = Some(Err("Scrape interval must be a whole number of seconds.".into()));
                    return true;
                };
                let source = NewSource {
                    url: self.draft.url.trim().to_string(),
                    name: self.draft.name.trim().to_string(),
                    description: self.draft.description.trim().to_string(),
                    active: self.draft.active,
                    scrape_interval,
                };
                api::create_source(source, ctx, Msg::Created);
            }
            Msg::Created(result) => match result {
                Ok(source) => {
                    self.notice = Some(Ok(format!("Added {}", source.url)));
                    self.draft = Draft::default();
                    self.reload(ctx);
                }
                Err(err) => self.notice = Some(Err(err.to_string())),
            },
            Msg::Toggle(id, active) => {
                let update = SourceUpdate {
                    active: Some(active),
                    ..Default::default()
                };
                api::update_source(id, update, ctx, Msg::Updated);
            }
            Msg::Updated(result) => match result {
                Ok(updated) => {
                    if let FetchState::Success(sources) = &mut self.sources {
                        if let Some(source) = sources.iter_mut().find(|s| s.id == updated.id) {
                            *source = updated;
                        }
                    }
                }
                Err(err) => self.notice = Some(Err(err.to_string())),
            },
            Msg::Delete(id) => {
                api::delete_source(id, ctx, move |result| Msg::Deleted(id, result));
            }
            Msg::Deleted(id, result) => match result {
                Ok(()) => {
                    if let FetchState::Success(sources) = &mut self.sources {
                        sources.retain(|s| s.id != id);
                    }
                    self.notice = Some(Ok(format!("Deleted source #{}", id)));
                }
                Err(err) => self.notice = Some(Err(err.to_string())),
            },
            Msg::Scrape(id) => {
                self.notice = Some(Ok(format!("Scraping source #{}…", id)));
                api::scrape_source(id, ctx, Msg::Scraped);
            }
            Msg::Scraped(result) => {
                self.notice = Some(match result {
                    Ok(result) => {
                        let session = result.session;
                        match session.error_message {
                            Some(message) => Err(format!("Session #{} {}: {}", session.id, session.status, message)),
                            None => Ok(format!(
                                "Session #{} {}, {} IOCs found",
                                session.id, session.status, session.iocs_found
                            )),
                        }
                    }
                    Err(err) => Err(err.to_string()),
                });
                self.reload(ctx);
            }
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let notice = self.notice.as_ref().map(|notice| match notice {
            Ok(message) => html! {<p class="notice">{message}</p>},
            Err(message) => html! {<p class="notice error">{message}</p>},
        });
        let table = match &self.sources {
            FetchState::Success(sources) => self.table(ctx, sources),
            other => pending_view(other).unwrap_or_default(),
        };
        html! {
            <>
                <div class="card">{self.form(ctx)}{notice}</div>
                <div class="card">{table}</div>
            </>
        }
    }
}
