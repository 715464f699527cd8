mod app;
mod config;
mod fetch;
mod protocol;
mod submit;
mod validation;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use fetch::FetchError;
pub use protocol::ProtocolError;
pub use submit::SubmitError;
pub use validation::ValidationError;
