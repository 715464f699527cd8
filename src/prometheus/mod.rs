//! Client for the Prometheus HTTP query API.
mod client;
mod tls;
mod types;


pub use client::{LABELS_PATH, PrometheusClient, QUERY_RANGE_PATH};
pub use types::{RawSample, RawSeries};
