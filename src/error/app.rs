use thiserror::Error;

use super::{ConfigError, FetchError, ProtocolError, SubmitError, ValidationError};

/// Exit status used for configuration and usage failures.
pub const EXIT_CONFIGURATION: u8 = 2;
/// Exit status used for any other fatal failure.
pub const EXIT_FAILURE: u8 = 1;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("CLI error: {source}")]
    Clap {
        #[from]
        source: clap::Error,
    },
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
    #[error("Submit error: {0}")]
    Submit(#[from] SubmitError),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation<E>(error: E) -> Self
    where
        E: Into<ValidationError>,
    {
        error.into().into()
    }

    pub fn config<E>(error: E) -> Self
    where
        E: Into<ConfigError>,
    {
        error.into().into()
    }

    pub fn fetch<E>(error: E) -> Self
    where
        E: Into<FetchError>,
    {
        error.into().into()
    }

    pub fn protocol<E>(error: E) -> Self
    where
        E: Into<ProtocolError>,
    {
        error.into().into()
    }

    pub fn submit<E>(error: E) -> Self
    where
        E: Into<SubmitError>,
    {
        error.into().into()
    }

    /// Whether another attempt of the same network call may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::Fetch(error) => error.is_retryable(),
            AppError::Submit(error) => error.is_retryable(),
            AppError::Io { .. }
            | AppError::Clap { .. }
            | AppError::Json { .. }
            | AppError::Validation(_)
            | AppError::Config(_)
            | AppError::Protocol(_) => false,
        }
    }

    /// Short name of the failure class, used in retry logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            AppError::Io { .. } => "Io",
            AppError::Clap { .. } => "Clap",
            AppError::Json { .. } => "Json",
            AppError::Validation(_) => "Validation",
            AppError::Config(_) => "Configuration",
            AppError::Fetch(_) => "TransientFetch",
            AppError::Protocol(_) => "Protocol",
            AppError::Submit(_) => "Submit",
        }
    }

    /// Process exit status for a fatal error.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            AppError::Clap { .. } | AppError::Validation(_) | AppError::Config(_) => {
                EXIT_CONFIGURATION
            }
            AppError::Io { .. }
            | AppError::Json { .. }
            | AppError::Fetch(_)
            | AppError::Protocol(_)
            | AppError::Submit(_) => EXIT_FAILURE,
        }
    }
}
