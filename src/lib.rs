//! Core library for the `promql-to-dd` CLI.
//!
//! The binary polls counters and histograms from a Prometheus-compatible
//! query API, converts counters to 1-minute rate series and histograms to
//! per-quantile gauges, and submits them to the Datadog series intake. The
//! modules here are the building blocks it wires together; library APIs may
//! change as the CLI grows.
pub mod args;
pub mod bridge;
pub mod clock;
pub mod config;
pub mod datadog;
pub mod entry;
pub mod error;
pub mod logger;
pub mod ports;
pub mod prometheus;
pub mod query;
pub mod retry;
pub mod shutdown;
pub mod shutdown_handlers;
pub mod transform;
pub mod window;
