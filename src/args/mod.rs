//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
pub(crate) mod parsers;
mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use cli::BridgeArgs;
pub use types::{FailurePolicy, PositiveU64, PositiveUsize};

pub(crate) use defaults::{
    ACCOUNT_HOST_SUFFIX, DEFAULT_CHUNK_SIZE, DEFAULT_CONFIG_FILES, DEFAULT_STEP_SECS,
    DEFAULT_USER_AGENT,
};
pub(crate) use parsers::parse_duration_value;
