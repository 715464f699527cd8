use super::Quantile;

/// Range selector used by every rate query; 1m is the minimum for 30s samples.
pub const RATE_RANGE: &str = "1m";
/// Labels preserved when aggregating histogram buckets before the quantile.
pub const HISTOGRAM_GROUP_BY: &str = "temporal_account,temporal_namespace,operation,le";

/// Per-second rate of a counter over [`RATE_RANGE`].
#[must_use]
pub fn counter_query(name: &str) -> String {
    format!("rate({name}[{RATE_RANGE}])")
}

/// Quantile estimate over the summed bucket rates of a histogram.
#[must_use]
pub fn histogram_quantile_query(name: &str, quantile: Quantile) -> String {
    format!(
        "histogram_quantile({quantile}, sum(rate({name}[{RATE_RANGE}])) by ({HISTOGRAM_GROUP_BY}))"
    )
}
