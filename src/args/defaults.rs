pub(crate) const DEFAULT_USER_AGENT: &str = concat!("promql-to-dd/", env!("CARGO_PKG_VERSION"));

/// Config files checked in the working directory when `--config` is not set.
pub(crate) const DEFAULT_CONFIG_FILES: [&str; 2] = ["promql-to-dd.toml", "promql-to-dd.json"];

pub(crate) const DEFAULT_STEP_SECS: u64 = 60;
pub(crate) const DEFAULT_CHUNK_SIZE: usize = 200;

/// Host suffix of the hosted Prometheus endpoint, prefixed by the account id.
pub(crate) const ACCOUNT_HOST_SUFFIX: &str = "tmprl.cloud";
