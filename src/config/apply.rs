use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{BridgeArgs, PositiveU64, PositiveUsize};
use crate::error::{AppError, AppResult, ConfigError};

use super::types::{ConfigFile, DurationValue, RetryConfig};

/// Applies configuration-file values to arguments not set on the command
/// line or through the environment.
///
/// # Errors
///
/// Returns an error when a config value fails validation.
pub fn apply_config(
    args: &mut BridgeArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    apply_source_config(args, matches, config);
    apply_destination_config(args, matches, config);
    apply_schedule_config(args, matches, config)?;
    if let Some(retry) = config.retry.as_ref() {
        apply_retry_config(args, matches, retry)?;
    }

    if !is_explicit(matches, "on_failure")
        && let Some(policy) = config.on_failure
    {
        args.on_failure = policy;
    }
    if !is_explicit(matches, "verbose")
        && let Some(value) = config.verbose
    {
        args.verbose = value;
    }
    if !is_explicit(matches, "no_color")
        && let Some(value) = config.no_color
    {
        args.no_color = value;
    }
    Ok(())
}

fn is_explicit(matches: &ArgMatches, name: &str) -> bool {
    matches!(
        matches.value_source(name),
        Some(ValueSource::CommandLine | ValueSource::EnvVariable)
    )
}

fn fill(target: &mut Option<String>, matches: &ArgMatches, name: &str, value: Option<&String>) {
    if !is_explicit(matches, name)
        && let Some(value) = value
    {
        *target = Some(value.clone());
    }
}

fn apply_source_config(args: &mut BridgeArgs, matches: &ArgMatches, config: &ConfigFile) {
    fill(
        &mut args.temporal_account,
        matches,
        "temporal_account",
        config.temporal_account.as_ref(),
    );
    fill(
        &mut args.prom_endpoint,
        matches,
        "prom_endpoint",
        config.prom_endpoint.as_ref(),
    );
    fill(
        &mut args.metrics_client_cert,
        matches,
        "metrics_client_cert",
        config.metrics_client_cert.as_ref(),
    );
    fill(
        &mut args.metrics_client_key,
        matches,
        "metrics_client_key",
        config.metrics_client_key.as_ref(),
    );
    fill(
        &mut args.server_root_ca_cert,
        matches,
        "server_root_ca_cert",
        config.server_root_ca_cert.as_ref(),
    );
    fill(
        &mut args.metric_prefix,
        matches,
        "metric_prefix",
        config.metric_prefix.as_ref(),
    );
    if !is_explicit(matches, "insecure_skip_verify")
        && let Some(value) = config.insecure_skip_verify
    {
        args.insecure_skip_verify = value;
    }
}

fn apply_destination_config(args: &mut BridgeArgs, matches: &ArgMatches, config: &ConfigFile) {
    fill(&mut args.dd_site, matches, "dd_site", config.dd_site.as_ref());
    fill(
        &mut args.dd_api_key,
        matches,
        "dd_api_key",
        config.dd_api_key.as_ref(),
    );
    fill(
        &mut args.dd_endpoint,
        matches,
        "dd_endpoint",
        config.dd_endpoint.as_ref(),
    );
    fill(
        &mut args.dd_metric_prefix,
        matches,
        "dd_metric_prefix",
        config.dd_metric_prefix.as_ref(),
    );
}

fn apply_schedule_config(
    args: &mut BridgeArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    let durations = [
        (&mut args.step, "step", config.step.as_ref()),
        (
            &mut args.initial_window,
            "initial_window",
            config.initial_window.as_ref(),
        ),
        (
            &mut args.overlap_window,
            "overlap_window",
            config.overlap_window.as_ref(),
        ),
        (
            &mut args.poll_interval,
            "poll_interval",
            config.poll_interval.as_ref(),
        ),
        (&mut args.request_timeout, "request_timeout", config.timeout.as_ref()),
        (
            &mut args.connect_timeout,
            "connect_timeout",
            config.connect_timeout.as_ref(),
        ),
    ];
    for (target, name, value) in durations {
        if !is_explicit(matches, name)
            && let Some(value) = value
        {
            *target = config_duration(value, name)?;
        }
    }

    if !is_explicit(matches, "quantiles")
        && let Some(quantiles) = config.quantiles.as_ref()
    {
        args.quantiles.clone_from(quantiles);
    }

    if !is_explicit(matches, "chunk_size")
        && let Some(value) = config.chunk_size
    {
        args.chunk_size = PositiveUsize::try_from(value).map_err(|err| {
            AppError::config(ConfigError::InvalidField {
                field: "chunk_size",
                source: err,
            })
        })?;
    }
    Ok(())
}

fn apply_retry_config(
    args: &mut BridgeArgs,
    matches: &ArgMatches,
    retry: &RetryConfig,
) -> AppResult<()> {
    if !is_explicit(matches, "retry_attempts")
        && let Some(value) = retry.attempts
    {
        args.retry_attempts = PositiveUsize::try_from(value).map_err(|err| {
            AppError::config(ConfigError::InvalidField {
                field: "retry.attempts",
                source: err,
            })
        })?;
    }
    if !is_explicit(matches, "retry_multiplier")
        && let Some(value) = retry.multiplier
    {
        args.retry_multiplier = PositiveU64::try_from(value).map_err(|err| {
            AppError::config(ConfigError::InvalidField {
                field: "retry.multiplier",
                source: err,
            })
        })?;
    }
    if !is_explicit(matches, "retry_min")
        && let Some(value) = retry.min.as_ref()
    {
        args.retry_min = config_duration(value, "retry.min")?;
    }
    if !is_explicit(matches, "retry_max")
        && let Some(value) = retry.max.as_ref()
    {
        args.retry_max = config_duration(value, "retry.max")?;
    }
    Ok(())
}

fn config_duration(value: &DurationValue, field: &'static str) -> AppResult<std::time::Duration> {
    value
        .to_duration()
        .map_err(|source| AppError::config(ConfigError::InvalidField { field, source }))
}

