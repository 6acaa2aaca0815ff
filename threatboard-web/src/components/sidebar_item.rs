use crate::route::Route;
use yew::prelude::*;
use yew_router::components::Link;

#[derive(Properties, Debug, PartialEq, Clone)]
pub struct Props {
    pub dest: Route,
    pub active: bool,
    pub title: &'static str,
}

#[function_component(SidebarItem)]
pub fn sidebar_item(props: &Props) -> Html {
    type Anchor = Link<Route>;
    let class = if props.active { Some("active") } else { None };
    html! {
        <li {class}>
            <Anchor to={props.dest}>
                <span>{props.title}</span>
            </Anchor>
        </li>
    }
}
