use std::time::Duration;

use serde::Deserialize;

use crate::args::{FailurePolicy, parse_duration_value};
use crate::error::ValidationError;
use crate::query::Quantile;

/// On-disk configuration. Every key mirrors a CLI flag; unset keys keep the
/// flag's value.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub temporal_account: Option<String>,
    pub prom_endpoint: Option<String>,
    pub metrics_client_cert: Option<String>,
    pub metrics_client_key: Option<String>,
    pub server_root_ca_cert: Option<String>,
    pub insecure_skip_verify: Option<bool>,
    pub metric_prefix: Option<String>,
    pub dd_site: Option<String>,
    pub dd_api_key: Option<String>,
    pub dd_endpoint: Option<String>,
    pub dd_metric_prefix: Option<String>,
    pub step: Option<DurationValue>,
    pub initial_window: Option<DurationValue>,
    pub overlap_window: Option<DurationValue>,
    pub poll_interval: Option<DurationValue>,
    pub quantiles: Option<Vec<Quantile>>,
    pub chunk_size: Option<usize>,
    pub timeout: Option<DurationValue>,
    pub connect_timeout: Option<DurationValue>,
    pub retry: Option<RetryConfig>,
    pub on_failure: Option<FailurePolicy>,
    pub verbose: Option<bool>,
    pub no_color: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    pub attempts: Option<usize>,
    pub multiplier: Option<u64>,
    pub min: Option<DurationValue>,
    pub max: Option<DurationValue>,
}

/// Either a number of seconds or a suffixed string like `"10m"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Seconds(secs) => parse_duration_value(&secs.to_string()),
            DurationValue::Text(text) => parse_duration_value(text),
        }
    }
}
