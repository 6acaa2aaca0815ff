//! The static table of client-side routes.
//!
//! Every path is a literal. There are no parameters, guards, redirects or a
//! catch-all entry: a path that is not listed here resolves to nothing and the
//! caller decides what to do about it.

use std::fmt;

/// The views the dashboard can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Dashboard,
    Sources,
    Iocs,
    AdHocScrape,
    Sessions,
}

/// One row of the route table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteEntry {
    pub path: &'static str,
    pub name: &'static str,
    pub view: View,
}

pub const ROUTES: [RouteEntry; 5] = [
    RouteEntry {
        path: "/",
        name: "Dashboard",
        view: View::Dashboard,
    },
    RouteEntry {
        path: "/sources",
        name: "Sources",
        view: View::Sources,
    },
    RouteEntry {
        path: "/iocs",
        name: "IOCs",
        view: View::Iocs,
    },
    RouteEntry {
        path: "/scrape",
        name: "AdHocScrape",
        view: View::AdHocScrape,
    },
    RouteEntry {
        path: "/sessions",
        name: "Sessions",
        view: View::Sessions,
    },
];

impl View {
    fn entry(self) -> &'static RouteEntry {
        match self {
            View::Dashboard => &ROUTES[0],
            View::Sources => &ROUTES[1],
            View::Iocs => &ROUTES[2],
            View::AdHocScrape => &ROUTES[3],
            View::Sessions => &ROUTES[4],
        }
    }

    pub fn path(self) -> &'static str {
        self.entry().path
    }

    pub fn name(self) -> &'static str {
        self.entry().name
    }

    /// Human readable title used in headers and navigation.
    pub fn title(self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::Sources => "Sources",
            View::Iocs => "IOCs",
            View::AdHocScrape => "Ad-Hoc Scrape",
            View::Sessions => "Sessions",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Resolves a navigation target to its route entry.
///
/// Any query string or fragment is ignored, the remaining path has to match a
/// table entry exactly. An empty path is the root.
pub fn resolve(target: &str) -> Option<&'static RouteEntry> {
    let path = target.split(['?', '#']).next().unwrap_or_default();
    let path = if path.is_empty() { "/" } else { path };
    ROUTES.iter().find(|entry| entry.path == path)
}

pub fn find_by_name(name: &str) -> Option<&'static RouteEntry> {
    ROUTES.iter().find(|entry| entry.name == name)
}
