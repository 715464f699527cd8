//! Configuration loading, application, and validation.
mod apply;
mod loader;
mod settings;
pub mod types;


pub use apply::apply_config;
pub use loader::load_config;
pub use settings::{
    BridgeConfig, DestinationSettings, ScheduleSettings, SourceSettings, join_endpoint,
};

#[cfg(test)]
pub(crate) use loader::load_config_file;
