use std::ffi::OsString;
use std::process::ExitCode;

use clap::{ArgMatches, CommandFactory, FromArgMatches};

use crate::args::BridgeArgs;
use crate::bridge::{Bridge, Termination};
use crate::clock::SystemClock;
use crate::config::{BridgeConfig, apply_config, load_config};
use crate::datadog::DatadogClient;
use crate::error::AppResult;
use crate::prometheus::PrometheusClient;
use crate::shutdown_handlers::{setup_signal_shutdown_handler, shutdown_channel};

/// Conventional status for a process stopped by SIGINT.
pub const EXIT_INTERRUPTED: u8 = 130;

/// Parses arguments, runs the poll loop, and maps the outcome to a process
/// exit status.
#[must_use]
pub fn run() -> ExitCode {
    match run_inner() {
        Ok(Termination::Interrupted) => ExitCode::from(EXIT_INTERRUPTED),
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::from(err.exit_code())
        }
    }
}

fn run_inner() -> AppResult<Termination> {
    let (mut args, matches) = parse_args()?;

    if let Some(config) = load_config(args.config.as_deref())? {
        apply_config(&mut args, &matches, &config)?;
    }

    crate::logger::init_logging(args.verbose, args.no_color);

    let config = BridgeConfig::from_args(&args)?;
    tracing::debug!("Resolved configuration: {:?}", config);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(&config))
}

fn parse_args() -> AppResult<(BridgeArgs, ArgMatches)> {
    let raw_args: Vec<OsString> = std::env::args_os().collect();
    let matches = BridgeArgs::command().get_matches_from(raw_args);
    let args = BridgeArgs::from_arg_matches(&matches)?;
    Ok((args, matches))
}

async fn run_async(config: &BridgeConfig) -> AppResult<Termination> {
    let source = PrometheusClient::new(&config.source)?;
    let sink = DatadogClient::new(&config.destination)?;
    let clock = SystemClock;

    let (shutdown_tx, mut shutdown_rx) = shutdown_channel();
    let signal_handle = setup_signal_shutdown_handler(&shutdown_tx);

    tracing::info!(
        "Starting ingestion from {} to {}",
        config.source.base_url,
        config.destination.base_url
    );
    let outcome = Bridge::new(&source, &sink, &clock, config)
        .run(&mut shutdown_rx)
        .await;

    signal_handle.abort();
    outcome
}
