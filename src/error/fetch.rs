use reqwest::StatusCode;
use thiserror::Error;

/// Transport-level failure while talking to the source query API.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {endpoint} failed: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Request to {endpoint} returned HTTP {status}.")]
    Status {
        endpoint: String,
        status: StatusCode,
    },
    #[error("Failed to read response body from {endpoint}: {source}")]
    ReadBody {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Request { .. } | FetchError::ReadBody { .. } => true,
            FetchError::Status { status, .. } => retryable_status(*status),
        }
    }
}

pub(crate) fn retryable_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}
