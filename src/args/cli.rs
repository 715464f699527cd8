use clap::Parser;
use std::time::Duration;

use crate::query::Quantile;

use super::parsers::{
    parse_bool_env, parse_duration_arg, parse_positive_u64, parse_positive_usize, parse_quantile,
};
use super::types::{FailurePolicy, PositiveU64, PositiveUsize};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Export Prometheus API counters and histograms and import them into Datadog Metrics.",
    next_help_heading = "Tuning Options"
)]
pub struct BridgeArgs {
    /// Account id; the source endpoint is https://<account>.tmprl.cloud/prometheus
    #[arg(long = "temporal-account", env = "TEMPORAL_ACCOUNT", help_heading = "Source")]
    pub temporal_account: Option<String>,

    /// Explicit Prometheus API base URL (overrides --temporal-account)
    #[arg(long = "prom-endpoint", env = "PROM_ENDPOINT", help_heading = "Source")]
    pub prom_endpoint: Option<String>,

    /// mTLS client certificate (PEM)
    #[arg(long = "metrics-client-cert", env = "METRICS_CLIENT_CERT", help_heading = "Source")]
    pub metrics_client_cert: Option<String>,

    /// mTLS client key (PEM, PKCS#8)
    #[arg(long = "metrics-client-key", env = "METRICS_CLIENT_KEY", help_heading = "Source")]
    pub metrics_client_key: Option<String>,

    /// Optional root CA used to verify the source server
    #[arg(long = "server-root-ca-cert", env = "SERVER_ROOT_CA_CERT", help_heading = "Source")]
    pub server_root_ca_cert: Option<String>,

    /// Skip verification of the source server certificate and host name
    #[arg(
        long = "insecure-skip-verify",
        env = "INSECURE_SKIP_VERIFY",
        value_parser = parse_bool_env,
        help_heading = "Source"
    )]
    pub insecure_skip_verify: bool,

    /// Only republish metrics whose name starts with this prefix
    #[arg(long = "metric-prefix", env = "METRIC_PREFIX", help_heading = "Source")]
    pub metric_prefix: Option<String>,

    /// Datadog site, e.g. datadoghq.com or us5.datadoghq.com
    #[arg(long = "dd-site", env = "DD_SITE", help_heading = "Destination")]
    pub dd_site: Option<String>,

    /// Datadog API key
    #[arg(long = "dd-api-key", env = "DD_API_KEY", hide_env_values = true, help_heading = "Destination")]
    pub dd_api_key: Option<String>,

    /// Explicit intake base URL (overrides the one derived from --dd-site)
    #[arg(long = "dd-endpoint", env = "DD_ENDPOINT", help_heading = "Destination")]
    pub dd_endpoint: Option<String>,

    /// Prefix prepended to every submitted metric name
    #[arg(long = "dd-metric-prefix", env = "DD_METRIC_PREFIX", help_heading = "Destination")]
    pub dd_metric_prefix: Option<String>,

    /// Query resolution and rate interval (whole seconds, supports s/m/h)
    #[arg(
        long = "step",
        env = "PROMQL_TO_DD_STEP",
        default_value = "60s",
        value_parser = parse_duration_arg
    )]
    pub step: Duration,

    /// Range queried on startup
    #[arg(
        long = "initial-window",
        env = "PROMQL_TO_DD_INITIAL_WINDOW",
        default_value = "240m",
        value_parser = parse_duration_arg
    )]
    pub initial_window: Duration,

    /// How far each iteration reaches back before the previous end
    #[arg(
        long = "overlap-window",
        env = "PROMQL_TO_DD_OVERLAP_WINDOW",
        default_value = "10m",
        value_parser = parse_duration_arg
    )]
    pub overlap_window: Duration,

    /// Pause between iterations
    #[arg(
        long = "poll-interval",
        env = "PROMQL_TO_DD_POLL_INTERVAL",
        default_value = "20s",
        value_parser = parse_duration_arg
    )]
    pub poll_interval: Duration,

    /// Histogram quantiles to pre-compute (comma separated)
    #[arg(
        long = "quantiles",
        env = "PROMQL_TO_DD_QUANTILES",
        value_delimiter = ',',
        default_value = "0.5,0.75,0.9,0.95,0.99",
        value_parser = parse_quantile
    )]
    pub quantiles: Vec<Quantile>,

    /// Series per submission request
    #[arg(
        long = "chunk-size",
        env = "PROMQL_TO_DD_CHUNK_SIZE",
        default_value = "200",
        value_parser = parse_positive_usize
    )]
    pub chunk_size: PositiveUsize,

    /// Timeout for a single HTTP request
    #[arg(
        long = "timeout",
        env = "PROMQL_TO_DD_TIMEOUT",
        default_value = "30s",
        value_parser = parse_duration_arg
    )]
    pub request_timeout: Duration,

    /// Timeout for establishing a new connection
    #[arg(
        long = "connect-timeout",
        env = "PROMQL_TO_DD_CONNECT_TIMEOUT",
        default_value = "10s",
        value_parser = parse_duration_arg
    )]
    pub connect_timeout: Duration,

    /// Attempts per network call before giving up
    #[arg(
        long = "retry-attempts",
        env = "PROMQL_TO_DD_RETRY_ATTEMPTS",
        default_value = "5",
        value_parser = parse_positive_usize
    )]
    pub retry_attempts: PositiveUsize,

    /// Backoff multiplier in seconds
    #[arg(
        long = "retry-multiplier",
        env = "PROMQL_TO_DD_RETRY_MULTIPLIER",
        default_value = "2",
        value_parser = parse_positive_u64
    )]
    pub retry_multiplier: PositiveU64,

    /// Shortest wait between attempts
    #[arg(
        long = "retry-min",
        env = "PROMQL_TO_DD_RETRY_MIN",
        default_value = "5s",
        value_parser = parse_duration_arg
    )]
    pub retry_min: Duration,

    /// Longest wait between attempts
    #[arg(
        long = "retry-max",
        env = "PROMQL_TO_DD_RETRY_MAX",
        default_value = "60s",
        value_parser = parse_duration_arg
    )]
    pub retry_max: Duration,

    /// What to do when an iteration still fails after retries
    #[arg(
        long = "on-failure",
        env = "PROMQL_TO_DD_ON_FAILURE",
        default_value = "continue",
        value_enum
    )]
    pub on_failure: FailurePolicy,

    /// Enable verbose logging (debug level unless PROMQL_TO_DD_LOG/RUST_LOG is set)
    #[arg(long, short = 'v', alias = "debug")]
    pub verbose: bool,

    /// Disable color output
    #[arg(long = "no-color", env = "NO_COLOR", value_parser = parse_bool_env)]
    pub no_color: bool,

    /// Path to config file (TOML/JSON). Defaults to ./promql-to-dd.toml or ./promql-to-dd.json if present.
    #[arg(long, env = "PROMQL_TO_DD_CONFIG")]
    pub config: Option<String>,
}
