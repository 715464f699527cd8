use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::args::{ACCOUNT_HOST_SUFFIX, BridgeArgs, FailurePolicy, PositiveU64, PositiveUsize};
use crate::error::{AppError, AppResult, ConfigError, ValidationError};
use crate::query::Quantile;
use crate::retry::RetryPolicy;

/// How to reach and authenticate against the source query API.
#[derive(Debug, Clone)]
pub struct SourceSettings {
    pub base_url: Url,
    pub client_cert: Option<PathBuf>,
    pub client_key: Option<PathBuf>,
    pub root_ca: Option<PathBuf>,
    pub insecure_skip_verify: bool,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl SourceSettings {
    /// Plain settings for a base URL, without client identity.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            client_cert: None,
            client_key: None,
            root_ca: None,
            insecure_skip_verify: false,
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// How to reach and authenticate against the ingestion API.
#[derive(Clone)]
pub struct DestinationSettings {
    pub base_url: Url,
    pub api_key: String,
    pub metric_prefix: String,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl DestinationSettings {
    #[must_use]
    pub const fn new(base_url: Url, api_key: String) -> Self {
        Self {
            base_url,
            api_key,
            metric_prefix: String::new(),
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl fmt::Debug for DestinationSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DestinationSettings")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .field("metric_prefix", &self.metric_prefix)
            .field("request_timeout", &self.request_timeout)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

/// Timing of the poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleSettings {
    /// Query step and rate interval, in seconds.
    pub step: PositiveU64,
    pub initial_window: Duration,
    pub overlap_window: Duration,
    pub poll_interval: Duration,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            step: PositiveU64::try_from(crate::args::DEFAULT_STEP_SECS).unwrap_or(PositiveU64::ONE),
            initial_window: Duration::from_secs(240 * 60),
            overlap_window: Duration::from_secs(10 * 60),
            poll_interval: Duration::from_secs(20),
        }
    }
}

/// Validated runtime configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub source: SourceSettings,
    pub destination: DestinationSettings,
    pub schedule: ScheduleSettings,
    pub quantiles: Vec<Quantile>,
    /// Only names starting with this are republished.
    pub metric_prefix: Option<String>,
    pub chunk_size: PositiveUsize,
    pub retry: RetryPolicy,
    pub on_failure: FailurePolicy,
}

impl BridgeConfig {
    /// Resolves and validates parsed arguments.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when a required parameter is missing or
    /// a value is out of range.
    pub fn from_args(args: &BridgeArgs) -> AppResult<Self> {
        let source = resolve_source(args)?;
        let destination = resolve_destination(args)?;

        let step = whole_seconds(args.step, "step")?;
        let schedule = ScheduleSettings {
            step,
            initial_window: args.initial_window,
            overlap_window: args.overlap_window,
            poll_interval: args.poll_interval,
        };

        if args.quantiles.is_empty() {
            return Err(AppError::config(ConfigError::NoQuantiles));
        }
        if args.retry_min > args.retry_max {
            return Err(AppError::config(ConfigError::RetryBoundsInverted));
        }
        let retry = RetryPolicy::new(
            args.retry_attempts,
            args.retry_multiplier,
            args.retry_min,
            args.retry_max,
        );

        Ok(Self {
            source,
            destination,
            schedule,
            quantiles: args.quantiles.clone(),
            metric_prefix: non_empty(args.metric_prefix.as_deref()).map(str::to_owned),
            chunk_size: args.chunk_size,
            retry,
            on_failure: args.on_failure,
        })
    }
}

fn resolve_source(args: &BridgeArgs) -> AppResult<SourceSettings> {
    let base_url = if let Some(endpoint) = non_empty(args.prom_endpoint.as_deref()) {
        parse_url(endpoint)?
    } else {
        let account = non_empty(args.temporal_account.as_deref()).ok_or(
            ConfigError::MissingParameter {
                flag: "temporal-account",
                env: "TEMPORAL_ACCOUNT",
            },
        )?;
        parse_url(&format!("https://{account}.{ACCOUNT_HOST_SUFFIX}/prometheus"))?
    };

    let client_cert = non_empty(args.metrics_client_cert.as_deref()).ok_or(
        ConfigError::MissingParameter {
            flag: "metrics-client-cert",
            env: "METRICS_CLIENT_CERT",
        },
    )?;
    let client_key = non_empty(args.metrics_client_key.as_deref()).ok_or(
        ConfigError::MissingParameter {
            flag: "metrics-client-key",
            env: "METRICS_CLIENT_KEY",
        },
    )?;

    Ok(SourceSettings {
        base_url,
        client_cert: Some(PathBuf::from(client_cert)),
        client_key: Some(PathBuf::from(client_key)),
        root_ca: non_empty(args.server_root_ca_cert.as_deref()).map(PathBuf::from),
        insecure_skip_verify: args.insecure_skip_verify,
        request_timeout: args.request_timeout,
        connect_timeout: args.connect_timeout,
    })
}

fn resolve_destination(args: &BridgeArgs) -> AppResult<DestinationSettings> {
    let base_url = if let Some(endpoint) = non_empty(args.dd_endpoint.as_deref()) {
        parse_url(endpoint)?
    } else {
        let site = non_empty(args.dd_site.as_deref()).ok_or(ConfigError::MissingParameter {
            flag: "dd-site",
            env: "DD_SITE",
        })?;
        site_url(site)?
    };
    let api_key = non_empty(args.dd_api_key.as_deref()).ok_or(ConfigError::MissingParameter {
        flag: "dd-api-key",
        env: "DD_API_KEY",
    })?;

    Ok(DestinationSettings {
        base_url,
        api_key: api_key.to_owned(),
        metric_prefix: args.dd_metric_prefix.clone().unwrap_or_default(),
        request_timeout: args.request_timeout,
        connect_timeout: args.connect_timeout,
    })
}

/// `datadoghq.eu` -> `https://api.datadoghq.eu`.
fn site_url(site: &str) -> AppResult<Url> {
    let site = site.trim().trim_end_matches('/');
    if site.is_empty() || site.contains("://") || site.contains('/') {
        return Err(AppError::config(ConfigError::InvalidField {
            field: "dd_site",
            source: ValidationError::InvalidSite {
                site: site.to_owned(),
            },
        }));
    }
    parse_url(&format!("https://api.{site}"))
}

fn parse_url(value: &str) -> AppResult<Url> {
    Url::parse(value).map_err(|err| {
        AppError::validation(ValidationError::InvalidUrl {
            url: value.to_owned(),
            source: err,
        })
    })
}

/// Joins `path` under `base`, keeping any path prefix the base carries.
///
/// # Errors
///
/// Returns an error when `base` cannot carry a path (e.g. `mailto:`).
pub fn join_endpoint(base: &Url, path: &str) -> AppResult<Url> {
    let mut joined = base.clone();
    joined
        .path_segments_mut()
        .map_err(|()| {
            AppError::validation(ValidationError::UrlCannotBeBase {
                url: base.to_string(),
            })
        })?
        .pop_if_empty()
        .extend(path.split('/'));
    Ok(joined)
}

fn whole_seconds(duration: Duration, field: &'static str) -> AppResult<PositiveU64> {
    if duration.subsec_nanos() != 0 {
        return Err(AppError::config(ConfigError::InvalidField {
            field,
            source: ValidationError::DurationNotWholeSeconds {
                value: format!("{duration:?}"),
            },
        }));
    }
    PositiveU64::try_from(duration.as_secs())
        .map_err(|err| AppError::config(ConfigError::InvalidField { field, source: err }))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
