use std::collections::HashSet;

/// Suffix Prometheus uses for the bucket component of a histogram.
pub const BUCKET_SUFFIX: &str = "_bucket";

#[must_use]
pub fn is_histogram_name(name: &str) -> bool {
    name.ends_with(BUCKET_SUFFIX)
}

/// Metric names split into the two shapes we know how to republish.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricCatalog {
    pub histograms: Vec<String>,
    pub counters: Vec<String>,
}

impl MetricCatalog {
    /// Classifies the upstream name list.
    ///
    /// Names ending in `_bucket` are histograms. Every other name is a counter
    /// unless it is a sibling of a histogram (`_sum`, `_count`, ...), i.e. the
    /// part before its last `_` plus `_bucket` is a known histogram. An
    /// optional prefix restricts both sets.
    #[must_use]
    pub fn classify<I, S>(names: I, prefix: Option<&str>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names
            .into_iter()
            .map(Into::into)
            .filter(|name| prefix.is_none_or(|wanted| name.starts_with(wanted)))
            .collect();

        let histogram_set: HashSet<&str> = names
            .iter()
            .map(String::as_str)
            .filter(|name| is_histogram_name(name))
            .collect();

        let counters = names
            .iter()
            .filter(|name| !histogram_set.contains(sibling_bucket(name).as_str()))
            .cloned()
            .collect();
        let histograms = names
            .iter()
            .filter(|name| is_histogram_name(name))
            .cloned()
            .collect();

        Self {
            histograms,
            counters,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.histograms.is_empty() && self.counters.is_empty()
    }
}

/// `latency_count` -> `latency_bucket`, `up` -> `_bucket`.
fn sibling_bucket(name: &str) -> String {
    let stem = name.rsplit_once('_').map_or("", |(stem, _)| stem);
    format!("{stem}{BUCKET_SUFFIX}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, AppResult};

    #[test]
    fn histogram_components_are_not_counters() -> AppResult<()> {
        let catalog = MetricCatalog::classify(
            [
                "latency_bucket",
                "latency_count",
                "latency_sum",
                "requests_total",
                "up",
            ],
            None,
        );

        if catalog.histograms != ["latency_bucket"] {
            return Err(AppError::validation(format!(
                "Unexpected histograms: {:?}",
                catalog.histograms
            )));
        }
        if catalog.counters != ["requests_total", "up"] {
            return Err(AppError::validation(format!(
                "Unexpected counters: {:?}",
                catalog.counters
            )));
        }
        Ok(())
    }

    #[test]
    fn no_name_lands_in_both_sets() -> AppResult<()> {
        let names = [
            "a_bucket",
            "a_count",
            "b_bucket_bucket",
            "b_bucket_count",
            "c_total",
            "_bucket",
            "plain",
        ];
        let catalog = MetricCatalog::classify(names, None);
        for name in &catalog.histograms {
            if catalog.counters.contains(name) {
                return Err(AppError::validation(format!("{} is in both sets", name)));
            }
        }
        // `plain` has no underscore, so its sibling is `_bucket`, which is a histogram here
        if catalog.counters.iter().any(|name| name == "plain") {
            return Err(AppError::validation("Expected plain to be excluded"));
        }
        if !catalog.counters.iter().any(|name| name == "c_total") {
            return Err(AppError::validation("Expected c_total to be a counter"));
        }
        Ok(())
    }

    #[test]
    fn prefix_filters_both_sets() -> AppResult<()> {
        let catalog = MetricCatalog::classify(
            [
                "temporal_cloud_v0_latency_bucket",
                "temporal_cloud_v0_poll_total",
                "go_gc_duration_seconds_bucket",
                "process_cpu_seconds_total",
            ],
            Some("temporal_cloud_"),
        );
        if catalog.histograms != ["temporal_cloud_v0_latency_bucket"] {
            return Err(AppError::validation(format!(
                "Unexpected histograms: {:?}",
                catalog.histograms
            )));
        }
        if catalog.counters != ["temporal_cloud_v0_poll_total"] {
            return Err(AppError::validation(format!(
                "Unexpected counters: {:?}",
                catalog.counters
            )));
        }
        Ok(())
    }

    #[test]
    fn empty_input_yields_empty_catalog() -> AppResult<()> {
        let catalog = MetricCatalog::classify(Vec::<String>::new(), None);
        if !catalog.is_empty() {
            return Err(AppError::validation("Expected empty catalog"));
        }
        Ok(())
    }
}
