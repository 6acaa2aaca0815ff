use crate::components::sidebar_item::SidebarItem;
use crate::route::Route;
use threatboard::ROUTES;
use yew::{function_component, html, use_state_eq, Callback, Html};
use yew_router::hooks::use_route;

#[function_component(Sidebar)]
pub fn sidebar() -> Html {
    let always_show = use_state_eq(|| false);
    let current = use_route::<Route>();
    let items: Vec<_> = ROUTES
        .iter()
        .map(|entry| {
            let dest = Route::from_view(entry.view);
            html! {<SidebarItem {dest} active={current == Some(dest)} title={entry.view.title()}/>}
        })
        .collect();
    let ul = html! {
        <ul>
            {items}
        </ul>
    };

    let class_name = if *always_show {
        "sidebar show"
    } else {
        "sidebar"
    };
    let hide_self = {
        let always_show = always_show.clone();
        Callback::from(move |_| always_show.set(false))
    };
    let show_self = {
        let always_show = always_show;
        Callback::from(move |_| always_show.set(true))
    };
    html! {
        <>
        <div id="show_sidebar"><span onclick={show_self} >{"☰"}</span></div>
        <div class={class_name}>
            <div class="title">
                <h1>{"Threatboard"}</h1>
                <span id="hide_sidebar" onclick={&hide_self}>{"←"}</span>
            </div>
            <nav onclick={&hide_self}>
                {ul}
            </nav>
        </div>
        </>
    }
}
