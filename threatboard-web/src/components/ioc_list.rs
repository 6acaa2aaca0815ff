use crate::api::{self, FetchState};
use crate::app::Generation;
use crate::components::{pending_view, IocTable, Pager};
use anyhow::Error;
use threatboard::models::{IocPage, IocQuery, IocType, DEFAULT_IOCS_PER_PAGE};
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::context::ContextHandle;
use yew::prelude::*;

pub enum Msg {
    Load,
    Loaded(Result<IocPage, Error>),
    SetType(Option<String>),
    SetSearch(String),
    Search,
    Page(u32),
}

/// Browses the IOC list with type and substring filters.
pub struct IocList {
    query: IocQuery,
    search: String,
    page: FetchState<IocPage>,
    _handle: Option<ContextHandle<Generation>>,
}

impl IocList {
    fn filters(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let onchange = link.callback(|e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            let value = select.value();
            Msg::SetType((!value.is_empty()).then_some(value))
        });
        let current = self.query.ioc_type.clone().unwrap_or_default();
        let options: Vec<Html> = IocType::ALL
            .iter()
            .map(|t| {
                html! {
                    <option value={t.as_str()} selected={current == t.as_str()}>{t.as_str()}</option>
                }
            })
            .collect();
        let oninput = link.callback(|e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            Msg::SetSearch(input.value())
        });
        let onsubmit = link.callback(|e: SubmitEvent| {
            e.prevent_default();
            Msg::Search
        });
        html! {
            <form class="filters" {onsubmit}>
                <select {onchange}>
                    <option value="" selected={current.is_empty()}>{"all types"}</option>
                    {options}
                </select>
                <input type="search" placeholder="Search values" value={self.search.clone()} {oninput} />
                <button type="submit">{"Search"}</button>
            </form>
        }
    }
}

impl Component for IocList {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let handle = ctx
            .link()
            .context::<Generation>(ctx.link().callback(|_| Msg::Load))
            .map(|(_, handle)| handle);
        ctx.link().send_message(Msg::Load);
        Self {
            query: IocQuery {
                page: Some(1),
                per_page: Some(DEFAULT_IOCS_PER_PAGE),
                ..Default::default()
            },
            search: String::new(),
            page: FetchState::NotStarted,
            _handle: handle,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Load => {
                self.page = FetchState::Fetching;
                api::get_iocs(self.query.clone(), ctx, Msg::Loaded);
            }
            Msg::Loaded(result) => self.page = result.into(),
            Msg::SetType(ioc_type) => {
                self.query.ioc_type = ioc_type;
                self.query.page = Some(1);
                ctx.link().send_message(Msg::Load);
            }
            Msg::SetSearch(search) => {
                self.search = search;
                return false;
            }
            Msg::Search => {
                let search = self.search.trim();
                self.query.search = (!search.is_empty()).then(|| search.to_string());
                self.query.page = Some(1);
                ctx.link().send_message(Msg::Load);
            }
            Msg::Page(page) => {
                self.query.page = Some(page);
                ctx.link().send_message(Msg::Load);
            }
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let content = match &self.page {
            FetchState::Success(page) => {
                let onchange = ctx.link().callback(Msg::Page);
                html! {
                    <>
                        <p class="summary">{format!("{} IOCs", page.total)}</p>
                        <IocTable iocs={page.iocs.clone()} />
                        <Pager page={page.current_page} pages={page.pages} {onchange} />
                    </>
                }
            }
            other => pending_view(other).unwrap_or_default(),
        };
        html! {
            <>
                <div class="card">{self.filters(ctx)}</div>
                <div class="card">{content}</div>
            </>
        }
    }
}
