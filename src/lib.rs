//! # threatboard
//!
//! threatboard is the presentation layer of a threat-intelligence dashboard.
//! This crate holds the pieces shared by the single-page application and the
//! command-line tool: the static route table, the REST client for the
//! backend, the wire models it exchanges, and the environment configuration.

pub mod api;
pub mod config;
mod error;
pub mod models;
pub mod route;

pub use api::{ApiClient, ApiRequest, ApiResponse, Endpoint};
pub use error::ApiError;
pub use route::{RouteEntry, View, ROUTES};
