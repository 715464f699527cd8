//! Seams between the poll loop and the network clients.
use async_trait::async_trait;

use crate::args::PositiveU64;
use crate::datadog::{IntakeResponse, MetricSeries};
use crate::error::AppResult;
use crate::prometheus::RawSeries;
use crate::window::TimeWindow;

/// Where raw series come from.
#[async_trait]
pub trait MetricSource: Send + Sync {
    /// Every metric name the source knows about.
    async fn list_metric_names(&self) -> AppResult<Vec<String>>;

    /// Evaluates `query` over `window` at `step` second resolution.
    async fn query_range(
        &self,
        query: &str,
        window: TimeWindow,
        step: PositiveU64,
    ) -> AppResult<Vec<RawSeries>>;
}

/// Where converted series go. One call is one request.
#[async_trait]
pub trait SeriesSink: Send + Sync {
    async fn submit(&self, series: &[MetricSeries]) -> AppResult<IntakeResponse>;
}
