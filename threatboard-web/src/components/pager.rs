use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct Props {
    pub page: u32,
    pub pages: u32,
    pub onchange: Callback<u32>,
}

#[function_component(Pager)]
pub fn pager(props: &Props) -> Html {
    let page = props.page.max(1);
    let pages = props.pages.max(1);
    let prev = (page > 1).then(|| {
        let onchange = props.onchange.clone();
        html! {<span class="page-link" onclick={move |_| onchange.emit(page - 1)}>{"‹ Prev"}</span>}
    });
    let next = (page < pages).then(|| {
        let onchange = props.onchange.clone();
        html! {<span class="page-link" onclick={move |_| onchange.emit(page + 1)}>{"Next ›"}</span>}
    });
    html! {
        <div class="pager">
            {prev}
            <span class="page-info">{format!("Page {} of {}", page, pages)}</span>
            {next}
        </div>
    }
}
