use crate::args::PositiveUsize;
use crate::clock::Clock;
use crate::error::AppResult;
use crate::ports::SeriesSink;
use crate::retry::RetryPolicy;

use super::types::{IntakeResponse, MetricSeries};

/// Sends `series` in order, `chunk_size` per request, each request under
/// `retry`. Returns the responses that reported errors.
///
/// # Errors
///
/// Returns the first chunk error that survives the retry policy; later
/// chunks are not sent.
pub async fn submit_series(
    sink: &dyn SeriesSink,
    series: &[MetricSeries],
    chunk_size: PositiveUsize,
    retry: &RetryPolicy,
    clock: &dyn Clock,
) -> AppResult<Vec<IntakeResponse>> {
    if series.is_empty() {
        tracing::debug!("Nothing to ingest");
        return Ok(Vec::new());
    }

    let chunk_count = series.len().div_ceil(chunk_size.get());
    tracing::info!(
        "Ingesting {} series in {} requests",
        series.len(),
        chunk_count
    );

    let mut rejected = Vec::new();
    for (index, chunk) in series.chunks(chunk_size.get()).enumerate() {
        tracing::debug!(
            "Submitting chunk {}/{} ({} series)",
            index.saturating_add(1),
            chunk_count,
            chunk.len()
        );
        let response = retry
            .run(clock, "submit_metrics", || sink.submit(chunk))
            .await?;
        if !response.is_accepted() {
            rejected.push(response);
        }
    }
    Ok(rejected)
}
