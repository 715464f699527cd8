//! Conversion of raw query results into destination series.
mod tags;


use crate::args::PositiveU64;
use crate::datadog::{IntakeType, MetricPoint, MetricSeries};
use crate::error::AppResult;
use crate::prometheus::RawSeries;
use crate::query::{BUCKET_SUFFIX, Quantile};

pub use tags::{MAX_TAG_CHARS, ROLLUP_LABEL, build_tags};

/// Appended to counter names; matches the `[1m]` rate range.
pub const RATE_SUFFIX: &str = "_rate1m";

/// Names and shapes destination series.
#[derive(Debug, Clone)]
pub struct Transformer {
    step: PositiveU64,
    name_prefix: String,
}

impl Transformer {
    #[must_use]
    pub const fn new(step: PositiveU64, name_prefix: String) -> Self {
        Self { step, name_prefix }
    }

    /// `requests_total` -> rate series `requests_total_rate1m` with
    /// `interval = step`. The `__rollup__` label is not carried over.
    ///
    /// # Errors
    ///
    /// Returns a protocol error when a sample value is not a number.
    pub fn counter_to_rate_series(&self, name: &str, raw: &RawSeries) -> AppResult<MetricSeries> {
        Ok(MetricSeries {
            metric: format!("{}{}{}", self.name_prefix, name, RATE_SUFFIX),
            kind: IntakeType::Rate,
            interval: Some(self.step.get()),
            points: finite_points(raw)?,
            tags: build_tags(&raw.metric, Some(ROLLUP_LABEL)),
        })
    }

    /// `latency_bucket` at 0.95 -> gauge series `latency_P95`.
    ///
    /// # Errors
    ///
    /// Returns a protocol error when a sample value is not a number.
    pub fn histogram_to_quantile_series(
        &self,
        name: &str,
        quantile: Quantile,
        raw: &RawSeries,
    ) -> AppResult<MetricSeries> {
        let base = name.strip_suffix(BUCKET_SUFFIX).unwrap_or(name);
        Ok(MetricSeries {
            metric: format!("{}{}{}", self.name_prefix, base, quantile.name_suffix()),
            kind: IntakeType::Gauge,
            interval: None,
            points: finite_points(raw)?,
            tags: build_tags(&raw.metric, None),
        })
    }
}

/// Parses samples in order, skipping `NaN` and `±Inf`. Timestamps are
/// truncated to whole seconds.
fn finite_points(raw: &RawSeries) -> AppResult<Vec<MetricPoint>> {
    let mut points = Vec::with_capacity(raw.values.len());
    for sample in &raw.values {
        let value = sample.value()?;
        if !value.is_finite() {
            continue;
        }
        points.push(MetricPoint {
            // saturating cast drops fractional seconds
            timestamp: sample.timestamp() as i64,
            value,
        });
    }
    Ok(points)
}
