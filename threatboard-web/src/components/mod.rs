mod adhoc_scrape;
mod dashboard;
mod ioc_list;
mod ioc_table;
mod pager;
mod refresh_button;
mod session_table;
mod sessions;
mod sidebar;
mod sidebar_item;
mod sources;

pub use adhoc_scrape::AdHocScrape;
pub use dashboard::Dashboard;
pub use ioc_list::IocList;
pub use ioc_table::IocTable;
pub use pager::Pager;
pub use refresh_button::RefreshButton;
pub use session_table::SessionTable;
pub use sessions::Sessions;
pub use sidebar::Sidebar;
pub use sidebar_item::SidebarItem;
pub use sources::Sources;

use crate::api::FetchState;
use chrono::NaiveDateTime;
use yew::{html, Html};

pub fn format_time(time: &NaiveDateTime) -> String {
    time.format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn format_optional_time(time: &Option<NaiveDateTime>) -> String {
    time.as_ref().map(format_time).unwrap_or_else(|| "never".to_string())
}

/// What to show while a fetch has no data yet, or has failed.
pub fn pending_view<T>(state: &FetchState<T>) -> Option<Html> {
    match state {
        FetchState::Failed(reason) => Some(html! {<p class="error">{format!("failed {}", reason)}</p>}),
        FetchState::Fetching => Some(html! {<p>{"loading"}</p>}),
        FetchState::NotStarted => Some(html! {<p>{"not started"}</p>}),
        FetchState::Success(_) => None,
    }
}
