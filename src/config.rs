//! Environment driven configuration.
//!
//! A single value, `THREATBOARD_API_URL`, selects where the API lives. The
//! client uses it as its base URL and the dev server uses it as the proxy
//! target for `/api`.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

pub const API_URL_ENV: &str = "THREATBOARD_API_URL";
pub const DEFAULT_API_BASE: &str = "/api";
pub const DEFAULT_BACKEND_ORIGIN: &str = "http://localhost:5000";
pub const DEFAULT_DEV_PORT: u16 = 8080;

/// The API base URL baked in when the crate was compiled, falling back to
/// `/api`. The web build has no process environment, so this is what it uses.
pub fn build_time_api_base_url() -> &'static str {
    match option_env!("THREATBOARD_API_URL") {
        Some(url) if !url.is_empty() => url,
        _ => DEFAULT_API_BASE,
    }
}

/// The API base URL from `lookup`, falling back to `/api`.
pub fn api_base_url_from<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(API_URL_ENV)
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
}

/// Turns a path-only base such as `/api` into an absolute URL on `origin`.
/// Absolute bases are returned unchanged.
pub fn resolve_base_url(base: &str, origin: &str) -> String {
    if base.starts_with('/') {
        format!("{}{}", origin.trim_end_matches('/'), base)
    } else {
        base.to_string()
    }
}

/// Forwards every request under `prefix` to `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyRule {
    pub prefix: String,
    pub target: String,
    /// Rewrite the `Host` header to the target's authority.
    pub change_origin: bool,
    /// Verify the target's TLS certificate.
    pub secure: bool,
}

impl ProxyRule {
    pub fn matches(&self, path: &str) -> bool {
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'),
            None => false,
        }
    }

    /// The upstream URL for a request. The request path is kept whole,
    /// including the matched prefix.
    pub fn target_url(&self, path_and_query: &str) -> String {
        format!("{}{}", self.target.trim_end_matches('/'), path_and_query)
    }
}

/// Where the production build lands and how it is addressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    pub public_path: String,
    pub output_dir: String,
    pub assets_dir: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            public_path: "/".to_string(),
            output_dir: "dist".to_string(),
            assets_dir: "static".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub proxy: ProxyRule,
    pub build: BuildConfig,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        DevServerConfig {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_DEV_PORT,
            proxy: ProxyRule {
                prefix: DEFAULT_API_BASE.to_string(),
                target: DEFAULT_BACKEND_ORIGIN.to_string(),
                change_origin: true,
                secure: false,
            },
            build: BuildConfig::default(),
        }
    }
}

impl DevServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = DevServerConfig::default();
        if let Some(target) = lookup(API_URL_ENV).filter(|t| !t.is_empty()) {
            config.proxy.target = target;
        }
        config
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
