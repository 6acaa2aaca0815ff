use threatboard::View;
use yew_router::prelude::*;

/// Client side routes. Unknown paths match nothing and render an empty page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Routable)]
pub enum Route {
    #[at("/")]
    Dashboard,
    #[at("/sources")]
    Sources,
    #[at("/iocs")]
    Iocs,
    #[at("/scrape")]
    AdHocScrape,
    #[at("/sessions")]
    Sessions,
}

impl Route {
    pub fn view(self) -> View {
        match self {
            Route::Dashboard => View::Dashboard,
            Route::Sources => View::Sources,
            Route::Iocs => View::Iocs,
            Route::AdHocScrape => View::AdHocScrape,
            Route::Sessions => View::Sessions,
        }
    }

    pub fn from_view(view: View) -> Self {
        match view {
            View::Dashboard => Route::Dashboard,
            View::Sources => Route::Sources,
            View::Iocs => Route::Iocs,
            View::AdHocScrape => Route::AdHocScrape,
            View::Sessions => Route::Sessions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use threatboard::ROUTES;

    #[test]
    fn routable_paths_match_route_table() {
        for entry in ROUTES.iter() {
            let route = Route::from_view(entry.view);
            assert_eq!(route.to_path(), entry.path);
            assert_eq!(route.view(), entry.view);
            assert_eq!(Route::recognize(entry.path), Some(route));
        }
    }

    #[test]
    fn no_catch_all_route() {
        assert_eq!(Route::recognize("/does-not-exist"), None);
        assert_eq!(Route::not_found_route(), None);
    }
}
