use crate::components::{
    AdHocScrape, Dashboard, IocList, RefreshButton, Sessions, Sidebar, Sources,
};
use crate::route::Route;
use yew::prelude::*;
use yew_router::prelude::*;

/// Bumped by the refresh button; views re-fetch when it changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Generation(pub u32);

#[function_component(App)]
pub fn app() -> Html {
    html! {
        <BrowserRouter>
            <Sidebar />
            <Switch<Route> render={switch} />
        </BrowserRouter>
    }
}

fn switch(route: Route) -> Html {
    html! { <MainContent {route} /> }
}

#[derive(Properties, PartialEq)]
struct MainContentProps {
    route: Route,
}

#[function_component(MainContent)]
fn main_content(props: &MainContentProps) -> Html {
    let route = props.route;
    let generation = use_state_eq(Generation::default);
    let backend_status = use_state_eq(String::new);
    let on_refresh = {
        let generation = generation.clone();
        let backend_status = backend_status.clone();
        Callback::from(move |status: String| {
            let next = Generation(generation.0.wrapping_add(1));
            log::info!("Backend {}, reloading view (generation {})", status, next.0);
            backend_status.set(status);
            generation.set(next);
        })
    };
    let title_bar = html! {
        <header>
            <span id="title">{route.view().title()}</span>
            <span id="backend-status">{backend_status.as_str()}</span>
            <RefreshButton callback={on_refresh} />
        </header>
    };
    let content = match route {
        Route::Dashboard => html! { <Dashboard /> },
        Route::Sources => html! { <Sources /> },
        Route::Iocs => html! { <IocList /> },
        Route::AdHocScrape => html! { <AdHocScrape /> },
        Route::Sessions => html! { <Sessions /> },
    };
    html! {
        <div class="right-wrap">
            {title_bar}
            <main>
                <ContextProvider<Generation> context={*generation}>
                    {content}
                </ContextProvider<Generation>>
            </main>
        </div>
    }
}
