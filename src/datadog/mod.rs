//! Datadog metrics intake: payload types, the HTTP client, and chunked
//! submission.
mod batch;
mod client;
mod types;


pub use batch::submit_series;
pub use client::{DatadogClient, SERIES_PATH};
pub use types::{IntakeResponse, IntakeType, MetricPayload, MetricPoint, MetricSeries};
