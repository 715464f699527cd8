use thiserror::Error;

/// The upstream answered, but not with the shape we expect.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Failed to decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Query API reported {error_type}: {message}")]
    QueryFailed { error_type: String, message: String },
    #[error("Unexpected response status '{status}'.")]
    UnexpectedStatus { status: String },
    #[error("Unexpected result type '{result_type}', expected 'matrix'.")]
    UnexpectedResultType { result_type: String },
    #[error("Response did not include a data section.")]
    MissingData,
    #[error("Invalid sample value '{value}' at {timestamp}.")]
    InvalidSampleValue { value: String, timestamp: f64 },
}
