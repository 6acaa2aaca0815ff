use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Everything that can go wrong between calling an API method and getting its
/// payload back.
///
/// The variants only describe the failure. The client logs and forwards all of
/// them the same way and never retries.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("request failed with status code {status}")]
    Status { status: StatusCode, data: Value },
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// The HTTP status of a failed response, when the backend answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Network(err) => err.status(),
            _ => None,
        }
    }
}
