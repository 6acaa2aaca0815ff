//! Typed views of the JSON payloads the backend returns.
//!
//! The client itself treats every payload as opaque JSON; these types exist for
//! callers that want to decode a response with [`ApiResponse::json`].
//!
//! [`ApiResponse::json`]: crate::ApiResponse::json

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const DEFAULT_SCRAPE_INTERVAL: u32 = 3600;
pub const DEFAULT_IOCS_PER_PAGE: u32 = 50;
pub const DEFAULT_SESSIONS_PER_PAGE: u32 = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub id: u64,
    pub url: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub active: bool,
    pub scrape_interval: u32,
    pub last_scraped: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSource {
    pub url: String,
    pub name: String,
    pub description: String,
    pub active: bool,
    pub scrape_interval: u32,
}

impl NewSource {
    pub fn new(url: impl Into<String>) -> Self {
        NewSource {
            url: url.into(),
            name: String::new(),
            description: String::new(),
            active: true,
            scrape_interval: DEFAULT_SCRAPE_INTERVAL,
        }
    }
}

/// A partial update; only the fields that are set are sent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scrape_interval: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionStatus::Pending => "pending",
            SessionStatus::Running => "running",
            SessionStatus::Completed => "completed",
            SessionStatus::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeSession {
    pub id: u64,
    pub source_url_id: Option<u64>,
    pub status: SessionStatus,
    pub started_at: NaiveDateTime,
    pub completed_at: Option<NaiveDateTime>,
    pub error_message: Option<String>,
    pub iocs_found: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IocType {
    IpAddress,
    Url,
    Domain,
    Hash,
    Filename,
    Asn,
}

impl IocType {
    pub const ALL: [IocType; 6] = [
        IocType::IpAddress,
        IocType::Url,
        IocType::Domain,
        IocType::Hash,
        IocType::Filename,
        IocType::Asn,
    ];

    /// The value the backend uses on the wire and in `?type=` filters.
    pub fn as_str(self) -> &'static str {
        match self {
            IocType::IpAddress => "ip_address",
            IocType::Url => "url",
            IocType::Domain => "domain",
            IocType::Hash => "hash",
            IocType::Filename => "filename",
            IocType::Asn => "asn",
        }
    }

    pub fn parse(s: &str) -> Option<IocType> {
        IocType::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

impl fmt::Display for IocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ioc {
    pub id: u64,
    pub scrape_session_id: u64,
    pub ioc_type: IocType,
    pub value: String,
    pub context: Option<String>,
    pub confidence: f64,
    pub first_seen: NaiveDateTime,
    pub last_seen: NaiveDateTime,
}

/// Aggregate counters. Per-type counts are keyed by the wire name of the type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IocStats {
    pub total: u64,
    pub recent: u64,
    #[serde(flatten)]
    pub by_type: BTreeMap<String, u64>,
}

impl IocStats {
    pub fn count(&self, ioc_type: IocType) -> u64 {
        self.by_type.get(ioc_type.as_str()).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IocPage {
    pub iocs: Vec<Ioc>,
    pub total: u64,
    pub pages: u32,
    pub current_page: u32,
    pub per_page: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionPage {
    pub sessions: Vec<ScrapeSession>,
    pub total: u64,
    pub pages: u32,
    pub current_page: u32,
    pub per_page: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionIocs {
    pub session: ScrapeSession,
    pub iocs: Vec<Ioc>,
}

/// What a scrape call answers with: the session, plus the extracted IOCs when
/// the backend includes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeResult {
    #[serde(flatten)]
    pub session: ScrapeSession,
    #[serde(default)]
    pub iocs: Option<Vec<Ioc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IocQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub ioc_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
}
