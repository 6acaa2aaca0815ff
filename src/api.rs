//! REST client for the threatboard backend.
//!
//! Each method maps to exactly one HTTP request. Requests are logged before
//! they go out, failures are logged and handed back to the caller as they are.
//! Nothing is retried and there is no timeout.

use crate::config;
use crate::ApiError;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt::{self, Display};

/// The backend operations the client knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    HealthCheck,
    GetSources,
    CreateSource,
    UpdateSource,
    DeleteSource,
    ScrapeAdhoc,
    ScrapeSource,
    GetIocs,
    GetIocStats,
    GetSessions,
    GetSessionIocs,
}

impl Endpoint {
    pub const ALL: [Endpoint; 11] = [
        Endpoint::HealthCheck,
        Endpoint::GetSources,
        Endpoint::CreateSource,
        Endpoint::UpdateSource,
        Endpoint::DeleteSource,
        Endpoint::ScrapeAdhoc,
        Endpoint::ScrapeSource,
        Endpoint::GetIocs,
        Endpoint::GetIocStats,
        Endpoint::GetSessions,
        Endpoint::GetSessionIocs,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Endpoint::HealthCheck => "health_check",
            Endpoint::GetSources => "get_sources",
            Endpoint::CreateSource => "create_source",
            Endpoint::UpdateSource => "update_source",
            Endpoint::DeleteSource => "delete_source",
            Endpoint::ScrapeAdhoc => "scrape_adhoc",
            Endpoint::ScrapeSource => "scrape_source",
            Endpoint::GetIocs => "get_iocs",
            Endpoint::GetIocStats => "get_ioc_stats",
            Endpoint::GetSessions => "get_sessions",
            Endpoint::GetSessionIocs => "get_session_iocs",
        }
    }

    pub fn method(self) -> Method {
        match self {
            Endpoint::CreateSource | Endpoint::ScrapeAdhoc | Endpoint::ScrapeSource => Method::POST,
            Endpoint::UpdateSource => Method::PUT,
            Endpoint::DeleteSource => Method::DELETE,
            _ => Method::GET,
        }
    }

    /// The path relative to the API base. `{id}` stands for the record id.
    pub fn path_template(self) -> &'static str {
        match self {
            Endpoint::HealthCheck => "/health",
            Endpoint::GetSources | Endpoint::CreateSource => "/sources",
            Endpoint::UpdateSource | Endpoint::DeleteSource => "/sources/{id}",
            Endpoint::ScrapeAdhoc => "/scrape/adhoc",
            Endpoint::ScrapeSource => "/scrape/source/{id}",
            Endpoint::GetIocs => "/iocs",
            Endpoint::GetIocStats => "/iocs/stats",
            Endpoint::GetSessions => "/sessions",
            Endpoint::GetSessionIocs => "/sessions/{id}/iocs",
        }
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A single request, ready to be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    endpoint: Endpoint,
    path: String,
    query: String,
    body: Option<Value>,
}

impl ApiRequest {
    fn new(endpoint: Endpoint) -> Self {
        ApiRequest {
            endpoint,
            path: endpoint.path_template().to_string(),
            query: String::new(),
            body: None,
        }
    }

    fn with_id(endpoint: Endpoint, id: impl Display) -> Result<Self, ApiError> {
        let id = id.to_string();
        if id.trim().is_empty() {
            return Err(ApiError::InvalidArgument("id must not be empty"));
        }
        let mut request = Self::new(endpoint);
        request.path = request.path.replace("{id}", &id);
        Ok(request)
    }

    fn with_query<Q: Serialize + ?Sized>(mut self, params: &Q) -> Result<Self, ApiError> {
        self.query = serde_urlencoded::to_string(params)
            .map_err(|_| ApiError::InvalidArgument("query parameters must be a flat map"))?;
        Ok(self)
    }

    fn with_object_body<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let body = serde_json::to_value(body)?;
        if !body.is_object() {
            return Err(ApiError::InvalidArgument("request body must be a JSON object"));
        }
        self.body = Some(body);
        Ok(self)
    }

    pub fn health_check() -> Self {
        Self::new(Endpoint::HealthCheck)
    }

    pub fn get_sources() -> Self {
        Self::new(Endpoint::GetSources)
    }

    pub fn create_source<B: Serialize + ?Sized>(source: &B) -> Result<Self, ApiError> {
        Self::new(Endpoint::CreateSource).with_object_body(source)
    }

    pub fn update_source<B: Serialize + ?Sized>(
        source_id: impl Display,
        source: &B,
    ) -> Result<Self, ApiError> {
        Self::with_id(Endpoint::UpdateSource, source_id)?.with_object_body(source)
    }

    pub fn delete_source(source_id: impl Display) -> Result<Self, ApiError> {
        Self::with_id(Endpoint::DeleteSource, source_id)
    }

    /// `include_private_ips` defaults to `false` when not given.
    pub fn scrape_adhoc(url: &str, include_private_ips: Option<bool>) -> Result<Self, ApiError> {
        if url.trim().is_empty() {
            return Err(ApiError::InvalidArgument("url must not be empty"));
        }
        let mut request = Self::new(Endpoint::ScrapeAdhoc);
        request.body = Some(json!({
            "url": url,
            "include_private_ips": include_private_ips.unwrap_or(false),
        }));
        Ok(request)
    }

    pub fn scrape_source(source_id: impl Display) -> Result<Self, ApiError> {
        Self::with_id(Endpoint::ScrapeSource, source_id)
    }

    pub fn get_iocs<Q: Serialize + ?Sized>(params: &Q) -> Result<Self, ApiError> {
        Self::new(Endpoint::GetIocs).with_query(params)
    }

    pub fn get_ioc_stats() -> Self {
        Self::new(Endpoint::GetIocStats)
    }

    pub fn get_sessions<Q: Serialize + ?Sized>(params: &Q) -> Result<Self, ApiError> {
        Self::new(Endpoint::GetSessions).with_query(params)
    }

    pub fn get_session_iocs(session_id: impl Display) -> Result<Self, ApiError> {
        Self::with_id(Endpoint::GetSessionIocs, session_id)
    }

    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    pub fn method(&self) -> Method {
        self.endpoint.method()
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// The encoded query string, without the leading `?`. Empty when there are
    /// no parameters.
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn path_and_query(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query)
        }
    }
}

/// A successful response. The payload is passed through untouched; an empty
/// body becomes `null`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub data: Value,
}

impl ApiResponse {
    /// Decodes the payload into one of the [`models`](crate::models) types.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        T::deserialize(&self.data).map_err(|err| log_failure(err.into()))
    }
}

fn log_failure(err: ApiError) -> ApiError {
    log::error!("API Error: {}", err);
    err
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http_client(reqwest::Client::new(), base_url)
    }

    pub fn with_http_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        ApiClient {
            http,
            base_url: base_url.into(),
        }
    }

    /// A client whose base URL comes from `THREATBOARD_API_URL`, or `/api`.
    /// A path-only base is joined onto `origin`.
    pub fn from_env(origin: &str) -> Self {
        Self::from_lookup(origin, |key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(origin: &str, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = config::api_base_url_from(lookup);
        Self::new(config::resolve_base_url(&base, origin))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url_for(&self, request: &ApiRequest) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            request.path_and_query()
        )
    }

    /// Sends one request, logging it first and logging any failure.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = self.url_for(&request);
        let method = request.method();
        log::info!("API Request: {} {} ({})", method, url, request.endpoint());
        if let Some(body) = request.body() {
            log::debug!("API Request body: {}", body);
        }
        self.dispatch(&url, request).await.map_err(|err| {
            log::error!("API Error: {} {}: {}", method, url, err);
            err
        })
    }

    async fn call(&self, request: Result<ApiRequest, ApiError>) -> Result<ApiResponse, ApiError> {
        match request {
            Ok(request) => self.send(request).await,
            Err(err) => Err(log_failure(err)),
        }
    }

    async fn dispatch(&self, url: &str, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let mut builder = self
            .http
            .request(request.method(), url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        if !status.is_success() {
            // Non-JSON error bodies are kept as text.
            let data = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                    Value::String(String::from_utf8_lossy(&bytes).into_owned())
                })
            };
            return Err(ApiError::Status { status, data });
        }
        let data = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok(ApiResponse { status, data })
    }

    pub async fn health_check(&self) -> Result<ApiResponse, ApiError> {
        self.send(ApiRequest::health_check()).await
    }

    pub async fn get_sources(&self) -> Result<ApiResponse, ApiError> {
        self.send(ApiRequest::get_sources()).await
    }

    pub async fn create_source<B: Serialize + ?Sized>(
        &self,
        source: &B,
    ) -> Result<ApiResponse, ApiError> {
        self.call(ApiRequest::create_source(source)).await
    }

    pub async fn update_source<B: Serialize + ?Sized>(
        &self,
        source_id: impl Display,
        source: &B,
    ) -> Result<ApiResponse, ApiError> {
        self.call(ApiRequest::update_source(source_id, source)).await
    }

    pub async fn delete_source(&self, source_id: impl Display) -> Result<ApiResponse, ApiError> {
        self.call(ApiRequest::delete_source(source_id)).await
    }

    pub async fn scrape_adhoc(
        &self,
        url: &str,
        include_private_ips: Option<bool>,
    ) -> Result<ApiResponse, ApiError> {
        self.call(ApiRequest::scrape_adhoc(url, include_private_ips)).await
    }

    pub async fn scrape_source(&self, source_id: impl Display) -> Result<ApiResponse, ApiError> {
        self.call(ApiRequest::scrape_source(source_id)).await
    }

    pub async fn get_iocs<Q: Serialize + ?Sized>(
        &self,
        params: &Q,
    ) -> Result<ApiResponse, ApiError> {
        self.call(ApiRequest::get_iocs(params)).await
    }

    pub async fn get_ioc_stats(&self) -> Result<ApiResponse, ApiError> {
        self.send(ApiRequest::get_ioc_stats()).await
    }

    pub async fn get_sessions<Q: Serialize + ?Sized>(
        &self,
        params: &Q,
    ) -> Result<ApiResponse, ApiError> {
        self.call(ApiRequest::get_sessions(params)).await
    }

    pub async fn get_session_iocs(
        &self,
        session_id: impl Display,
    ) -> Result<ApiResponse, ApiError> {
        self.call(ApiRequest::get_session_iocs(session_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IocQuery, NewSource, SessionQuery, SourceUpdate};
    use std::collections::HashMap;

    #[test]
    fn every_endpoint_has_a_distinct_verb_and_path() {
        let mut seen = std::collections::HashSet::new();
        for endpoint in Endpoint::ALL {
            assert!(seen.insert((endpoint.method(), endpoint.path_template())));
            assert!(endpoint.path_template().starts_with('/'));
        }
        assert_eq!(seen.len(), 11);
    }

    #[test]
    fn environment_base_is_made_absolute() {
        let client = ApiClient::from_lookup("http://localhost:8080", |_| None);
        assert_eq!(client.base_url(), "http://localhost:8080/api");
        let client = ApiClient::from_lookup("http://localhost:8080", |_| {
            Some("https://intel.example.com/api".to_string())
        });
        assert_eq!(client.base_url(), "https://intel.example.com/api");
    }

    #[test]
    fn adhoc_scrape_defaults_private_ips_to_false() {
        let request = ApiRequest::scrape_adhoc("http://x.com", None).unwrap();
        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.path(), "/scrape/adhoc");
        assert_eq!(
            request.body(),
            Some(&json!({"url": "http://x.com", "include_private_ips": false}))
        );
        let request = ApiRequest::scrape_adhoc("http://x.com", Some(true)).unwrap();
        assert_eq!(request.body().unwrap()["include_private_ips"], json!(true));
    }

    #[test]
    fn ioc_query_is_encoded_only_when_present() {
        let empty: HashMap<String, String> = HashMap::new();
        assert_eq!(ApiRequest::get_iocs(&empty).unwrap().path_and_query(), "/iocs");
        assert_eq!(
            ApiRequest::get_iocs(&IocQuery::default()).unwrap().path_and_query(),
            "/iocs"
        );
        let filtered = ApiRequest::get_iocs(&vec![("type", "ip")]).unwrap();
        assert_eq!(filtered.path_and_query(), "/iocs?type=ip");
        let sessions = ApiRequest::get_sessions(&SessionQuery {
            page: Some(2),
            per_page: Some(20),
        })
        .unwrap();
        assert_eq!(sessions.path_and_query(), "/sessions?page=2&per_page=20");
    }

    #[test]
    fn ids_are_substituted_into_paths() {
        assert_eq!(
            ApiRequest::update_source(7, &SourceUpdate::default()).unwrap().path(),
            "/sources/7"
        );
        assert_eq!(ApiRequest::delete_source("12").unwrap().method(), Method::DELETE);
        assert_eq!(ApiRequest::scrape_source(3).unwrap().path(), "/scrape/source/3");
        assert_eq!(
            ApiRequest::get_session_iocs(5).unwrap().path(),
            "/sessions/5/iocs"
        );
    }

    #[test]
    fn invalid_inputs_are_rejected_before_sending() {
        assert!(matches!(
            ApiRequest::delete_source(""),
            Err(ApiError::InvalidArgument(_))
        ));
        assert!(matches!(
            ApiRequest::scrape_adhoc("  ", None),
            Err(ApiError::InvalidArgument(_))
        ));
        assert!(matches!(
            ApiRequest::create_source(&Value::Null),
            Err(ApiError::InvalidArgument(_))
        ));
        assert!(matches!(
            ApiRequest::create_source(&json!(["not", "an", "object"])),
            Err(ApiError::InvalidArgument(_))
        ));
    }

    #[test]
    fn create_source_sends_the_record_as_is() {
        let request = ApiRequest::create_source(&NewSource::new("https://feed.example")).unwrap();
        let body = request.body().unwrap();
        assert_eq!(body["url"], json!("https://feed.example"));
        assert_eq!(body["active"], json!(true));
        assert_eq!(body["scrape_interval"], json!(3600));
    }

    #[test]
    fn base_url_prefixes_every_request() {
        let default = ApiClient::new("/api");
        let remote = ApiClient::new("https://host/api/");
        let request = ApiRequest::health_check();
        assert_eq!(default.url_for(&request), "/api/health");
        assert_eq!(remote.url_for(&request), "https://host/api/health");
    }
}
