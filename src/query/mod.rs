//! PromQL construction and metric-name classification.
mod catalog;
mod promql;
mod quantile;

pub use catalog::{BUCKET_SUFFIX, MetricCatalog, is_histogram_name};
pub use promql::{HISTOGRAM_GROUP_BY, RATE_RANGE, counter_query, histogram_quantile_query};
pub use quantile::{DEFAULT_QUANTILES, Quantile};
