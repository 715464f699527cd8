use reqwest::StatusCode;
use thiserror::Error;

use super::fetch::retryable_status;

/// Failure while posting series to the ingestion API.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Failed to encode payload: {source}")]
    Encode {
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to compress payload: {source}")]
    Compress {
        #[source]
        source: std::io::Error,
    },
    #[error("Submission to {endpoint} failed: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Submission to {endpoint} returned HTTP {status}: {body}")]
    Status {
        endpoint: String,
        status: StatusCode,
        body: String,
    },
    #[error("Failed to decode intake response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

impl SubmitError {
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            SubmitError::Request { .. } => true,
            SubmitError::Status { status, .. } => retryable_status(*status),
            SubmitError::Encode { .. } | SubmitError::Compress { .. } | SubmitError::Decode { .. } => {
                false
            }
        }
    }
}
