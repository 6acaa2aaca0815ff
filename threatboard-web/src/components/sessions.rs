use crate::api::{self, FetchState};
use crate::app::Generation;
use crate::components::{pending_view, IocTable, Pager, SessionTable};
use anyhow::Error;
use threatboard::models::{SessionIocs, SessionPage, SessionQuery, DEFAULT_SESSIONS_PER_PAGE};
use yew::context::ContextHandle;
use yew::prelude::*;

pub enum Msg {
    Load,
    Loaded(Result<SessionPage, Error>),
    Page(u32),
    Select(u64),
    IocsLoaded(u64, Result<SessionIocs, Error>),
}

/// The session whose IOCs are shown, and their fetch state.
struct Selection {
    selected: Option<u64>,
    iocs: FetchState<SessionIocs>,
}

impl Selection {
    fn new() -> Self {
        Selection {
            selection: Selection::new(),
        }
    }

    fn select(&mut self, id: u64) {
        self.selected = Some(id);
        self.iocs = FetchState::Fetching;
    }

    /// Marks the current selection stale and returns the id to re-fetch.
    fn reload(&mut self) -> Option<u64> {
        let id = self.selected?;
        self.iocs = FetchState::Fetching;
        Some(id)
    }

    /// Stores a response unless the selection moved on since it was sent.
    fn accept(&mut self, id: u64, result: anyhow::Result<SessionIocs>) -> bool {
        if self.selected != Some(id) {
            return false;
        }
        self.iocs = result.into();
        true
    }
}

pub struct Sessions {
    query: SessionQuery,
    sessions: FetchState<SessionPage>,
    selection: Selection,
    _handle: Option<ContextHandle<Generation>>,
}

fn load_iocs(id: u64, ctx: &Context<Sessions>) {
    api::get_session_iocs(id, ctx, move |result| Msg::IocsLoaded(id, result));
}

impl Component for Sessions {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let handle = ctx
            .link()
            .context::<Generation>(ctx.link().callback(|_| Msg::Load))
            .map(|(_, handle)| handle);
        ctx.link().send_message(Msg::Load);
        Self {
            query: SessionQuery {
                page: Some(1),
                per_page: Some(DEFAULT_SESSIONS_PER_PAGE),
            },
            sessions: FetchState::NotStarted,
            selection: Selection::new(),
            _handle: handle,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Load => {
                self.sessions = FetchState::Fetching;
                api::get_sessions(self.query.clone(), ctx, Msg::Loaded);
                if let Some(id) = self.selection.reload() {
                    load_iocs(id, ctx);
                }
            }
            Msg::Loaded(result) => self.sessions = result.into(),
            Msg::Page(page) => {
                self.query.page = Some(page);
                ctx.link().send_message(Msg::Load);
            }
            Msg::Select(id) => {
                self.selection.select(id);
                load_iocs(id, ctx);
            }
            Msg::IocsLoaded(id, result) => return self.selection.accept(id, result),
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let list = match &self.sessions {
            FetchState::Success(page) => html! {
                <>
                    <p class="summary">{format!("{} sessions", page.total)}</p>
                    <SessionTable
                        sessions={page.sessions.clone()}
                        selected={self.selection.selected}
                        onselect={link.callback(Msg::Select)} />
                    <Pager page={page.current_page} pages={page.pages} onchange={link.callback(Msg::Page)} />
                </>
            },
            other => pending_view(other).unwrap_or_default(),
        };
        let detail = match (&self.selection.selected, &self.selection.iocs) {
            (None, _) => html! {<p class="empty">{"Select a session to see its IOCs."}</p>},
            (Some(_), FetchState::Success(detail)) => html! {
                <>
                    <h2>{format!("Session #{} ({})", detail.session.id, detail.session.status)}</h2>
                    <IocTable iocs={detail.iocs.clone()} />
                </>
            },
            (Some(_), other) => pending_view(other).unwrap_or_default(),
        };
        html! {
            <>
                <div class="card">{list}</div>
                <div class="card">{detail}</div>
            </>
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use threatboard::models::{ScrapeSession, SessionStatus};

    fn detail(id: u64) -> SessionIocs {
        let started_at = chrono::NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        SessionIocs {
            session: ScrapeSession {
                id,
                source_url_id: None,
                status: SessionStatus::Completed,
                started_at,
                completed_at: Some(started_at),
                error_message: None,
                iocs_found: 0,
            },
            iocs: Vec::new(),
        }
    }

    #[test]
    fn refresh_refetches_the_selected_session() {
        let mut selection = Selection::new();
        assert_eq!(selection.reload(), None);

        selection.select(7);
        assert!(selection.accept(7, Ok(detail(7))));
        assert!(matches!(selection.iocs, FetchState::Success(_)));

        assert_eq!(selection.reload(), Some(7));
        assert!(matches!(selection.iocs, FetchState::Fetching));
    }

    #[test]
    fn responses_for_an_earlier_selection_are_dropped() {
        let mut selection = Selection::new();
        selection.select(3);
        selection.select(4);
        assert!(!selection.accept(3, Ok(detail(3))));
        assert!(matches!(selection.iocs, FetchState::Fetching));
        assert!(selection.accept(4, Ok(detail(4))));
    }
}
