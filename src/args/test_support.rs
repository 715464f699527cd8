use clap::Parser;

use crate::error::{AppError, AppResult};

use super::BridgeArgs;

pub(crate) fn parse_test_args<I, T>(args: I) -> AppResult<BridgeArgs>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    BridgeArgs::try_parse_from(args).map_err(AppError::from)
}

/// Minimal command line with every required parameter present.
pub(crate) fn required_args() -> Vec<&'static str> {
    vec![
        "promql-to-dd",
        "--temporal-account",
        "acct.a1b2c",
        "--metrics-client-cert",
        "client.pem",
        "--metrics-client-key",
        "client.key",
        "--dd-site",
        "datadoghq.com",
        "--dd-api-key",
        "secret",
    ]
}
