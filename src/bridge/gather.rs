use super::Bridge;
use crate::datadog::MetricSeries;
use crate::error::AppResult;
use crate::prometheus::RawSeries;
use crate::query::{counter_query, histogram_quantile_query};
use crate::window::TimeWindow;

impl Bridge<'_> {
    /// One `rate(...)` query per counter, converted to rate series.
    pub(super) async fn gather_counters(
        &self,
        names: &[String],
        window: TimeWindow,
    ) -> AppResult<Vec<MetricSeries>> {
        tracing::info!("Gathering {} counters for {}", names.len(), window);
        let mut series = Vec::new();
        for name in names {
            let results = self.query(&counter_query(name), window).await?;
            for raw in &results {
                series.push(self.transformer.counter_to_rate_series(name, raw)?);
            }
        }
        Ok(series)
    }

    /// One `histogram_quantile(...)` query per histogram and quantile,
    /// converted to gauge series.
    pub(super) async fn gather_histograms(
        &self,
        names: &[String],
        window: TimeWindow,
    ) -> AppResult<Vec<MetricSeries>> {
        tracing::info!(
            "Gathering {} histograms at {} quantiles for {}",
            names.len(),
            self.config.quantiles.len(),
            window
        );
        let mut series = Vec::new();
        for name in names {
            for quantile in &self.config.quantiles {
                let query = histogram_quantile_query(name, *quantile);
                let results = self.query(&query, window).await?;
                for raw in &results {
                    series.push(
                        self.transformer
                            .histogram_to_quantile_series(name, *quantile, raw)?,
                    );
                }
            }
        }
        Ok(series)
    }

    async fn query(&self, query: &str, window: TimeWindow) -> AppResult<Vec<RawSeries>> {
        let step = self.config.schedule.step;
        self.config
            .retry
            .run(self.clock, "query_range", || {
                self.source.query_range(query, window, step)
            })
            .await
    }
}
