use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use super::{Bridge, Termination};
use crate::args::{FailurePolicy, PositiveU64, PositiveUsize};
use crate::clock::ManualClock;
use crate::config::{BridgeConfig, DestinationSettings, ScheduleSettings, SourceSettings};
use crate::datadog::{IntakeResponse, MetricSeries};
use crate::error::{AppError, AppResult, ProtocolError};
use crate::ports::{MetricSource, SeriesSink};
use crate::prometheus::{RawSample, RawSeries};
use crate::query::{MetricCatalog, Quantile, counter_query, histogram_quantile_query};
use crate::retry::RetryPolicy;
use crate::shutdown::ShutdownSender;
use crate::shutdown_handlers::shutdown_channel;
use crate::window::TimeWindow;

/// Not a step multiple, so alignment is visible.
const START_SECS: i64 = 1_000_020;

fn run_async_test<F>(future: F) -> AppResult<()>
where
    F: Future<Output = AppResult<()>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(future)
}

fn test_url(value: &str) -> AppResult<Url> {
    Url::parse(value).map_err(|err| {
        AppError::validation(crate::error::ValidationError::InvalidUrl {
            url: value.to_owned(),
            source: err,
        })
    })
}

fn test_config(on_failure: FailurePolicy) -> AppResult<BridgeConfig> {
    Ok(BridgeConfig {
        source: SourceSettings::new(test_url("http://prom.test")?),
        destination: DestinationSettings::new(test_url("http://dd.test")?, "key".to_owned()),
        schedule: ScheduleSettings::default(),
        quantiles: vec![Quantile::try_from(0.95)?],
        metric_prefix: None,
        chunk_size: PositiveUsize::try_from(200)?,
        retry: RetryPolicy::single_attempt(),
        on_failure,
    })
}

fn one_series(value: &str) -> Vec<RawSeries> {
    vec![RawSeries {
        metric: [("instance".to_owned(), "a".to_owned())].into_iter().collect(),
        values: vec![RawSample(1000.0, value.to_owned())],
    }]
}

/// Answers every query with one series; fails scripted calls first.
struct FakeSource {
    names: Vec<String>,
    responses: HashMap<String, Vec<RawSeries>>,
    name_failures: Mutex<usize>,
    query_failures: Mutex<usize>,
    queries: Mutex<Vec<(String, TimeWindow)>>,
}

impl FakeSource {
    fn new(names: &[&str]) -> Self {
        let mut responses = HashMap::new();
        for name in names {
            responses.insert(counter_query(name), one_series("5"));
            for quantile in [0.5, 0.95] {
                if let Ok(quantile) = Quantile::try_from(quantile) {
                    responses.insert(histogram_quantile_query(name, quantile), one_series("0.25"));
                }
            }
        }
        Self {
            names: names.iter().map(|name| (*name).to_owned()).collect(),
            responses,
            name_failures: Mutex::new(0),
            query_failures: Mutex::new(0),
            queries: Mutex::new(Vec::new()),
        }
    }

    fn failing_names(self, count: usize) -> Self {
        Self {
            name_failures: Mutex::new(count),
            ..self
        }
    }

    fn failing_queries(self, count: usize) -> Self {
        Self {
            query_failures: Mutex::new(count),
            ..self
        }
    }

    fn queries(&self) -> Vec<(String, TimeWindow)> {
        self.queries
            .lock()
            .map(|queries| queries.clone())
            .unwrap_or_default()
    }
}

fn take_failure(counter: &Mutex<usize>) -> bool {
    counter.lock().is_ok_and(|mut remaining| {
        if *remaining == 0 {
            false
        } else {
            *remaining = remaining.saturating_sub(1);
            true
        }
    })
}

#[async_trait]
impl MetricSource for FakeSource {
    async fn list_metric_names(&self) -> AppResult<Vec<String>> {
        if take_failure(&self.name_failures) {
            return Err(AppError::protocol(ProtocolError::MissingData));
        }
        Ok(self.names.clone())
    }

    async fn query_range(
        &self,
        query: &str,
        window: TimeWindow,
        _step: PositiveU64,
    ) -> AppResult<Vec<RawSeries>> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push((query.to_owned(), window));
        }
        if take_failure(&self.query_failures) {
            return Err(AppError::protocol(ProtocolError::UnexpectedResultType {
                result_type: "vector".to_owned(),
            }));
        }
        Ok(self.responses.get(query).cloned().unwrap_or_default())
    }
}

/// Records submitted names; broadcasts shutdown after `stop_after` calls.
struct StoppingSink {
    shutdown_tx: ShutdownSender,
    stop_after: usize,
    response: IntakeResponse,
    submitted: Mutex<Vec<Vec<String>>>,
}

impl StoppingSink {
    fn new(shutdown_tx: &ShutdownSender, stop_after: usize) -> Self {
        Self {
            shutdown_tx: shutdown_tx.clone(),
            stop_after,
            response: IntakeResponse::default(),
            submitted: Mutex::new(Vec::new()),
        }
    }

    fn submitted(&self) -> Vec<Vec<String>> {
        self.submitted
            .lock()
            .map(|submitted| submitted.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl SeriesSink for StoppingSink {
    async fn submit(&self, series: &[MetricSeries]) -> AppResult<IntakeResponse> {
        let calls = self.submitted.lock().map_or(0, |mut submitted| {
            submitted.push(series.iter().map(|item| item.metric.clone()).collect());
            submitted.len()
        });
        if calls >= self.stop_after {
            drop(self.shutdown_tx.send(()));
        }
        Ok(self.response.clone())
    }
}

#[test]
fn single_iteration_submits_counters_then_histograms() -> AppResult<()> {
    run_async_test(async {
        let config = test_config(FailurePolicy::Continue)?;
        let source = FakeSource::new(
            &["requests_total", "latency_bucket", "latency_count", "latency_sum"],
        );
        let (shutdown_tx, mut shutdown_rx) = shutdown_channel();
        let sink = StoppingSink::new(&shutdown_tx, 1);
        let clock = ManualClock::at(START_SECS);

        let termination = Bridge::new(&source, &sink, &clock, &config)
            .run(&mut shutdown_rx)
            .await?;
        if termination != Termination::Interrupted {
            return Err(AppError::validation("Expected an interrupted loop"));
        }

        let queries: Vec<String> = source.queries().into_iter().map(|(query, _)| query).collect();
        let expected = vec![
            "rate(requests_total[1m])".to_owned(),
            histogram_quantile_query("latency_bucket", Quantile::try_from(0.95)?),
        ];
        if queries != expected {
            return Err(AppError::validation(format!("Unexpected queries {:?}", queries)));
        }
        let submitted = sink.submitted();
        if submitted != vec![vec!["requests_total_rate1m".to_owned(), "latency_P95".to_owned()]] {
            return Err(AppError::validation(format!("Unexpected submission {:?}", submitted)));
        }
        Ok(())
    })
}

#[test]
fn window_is_aligned_then_advanced_with_overlap() -> AppResult<()> {
    run_async_test(async {
        let config = test_config(FailurePolicy::Continue)?;
        let source = FakeSource::new(&["requests_total"]);
        let (shutdown_tx, mut shutdown_rx) = shutdown_channel();
        let sink = StoppingSink::new(&shutdown_tx, 2);
        let clock = ManualClock::at(START_SECS);

        Bridge::new(&source, &sink, &clock, &config)
            .run(&mut shutdown_rx)
            .await?;

        let windows: Vec<TimeWindow> = source.queries().into_iter().map(|(_, window)| window).collect();
        // initial [985_620, 1_000_020] padded to step multiples, then
        // start = 1_000_080 - 600 and end = now (1_000_040) padded again
        let expected = vec![
            TimeWindow::new(985_560, 1_000_080),
            TimeWindow::new(999_420, 1_000_080),
        ];
        if windows != expected {
            return Err(AppError::validation(format!("Unexpected windows {:?}", windows)));
        }
        if clock.sleeps() != vec![Duration::from_secs(20), Duration::from_secs(20)] {
            return Err(AppError::validation(format!("Unexpected sleeps {:?}", clock.sleeps())));
        }
        Ok(())
    })
}

#[test]
fn failed_iteration_keeps_window_start_under_continue() -> AppResult<()> {
    run_async_test(async {
        let config = test_config(FailurePolicy::Continue)?;
        let source = FakeSource::new(&["requests_total"]).failing_queries(1);
        let (shutdown_tx, mut shutdown_rx) = shutdown_channel();
        let sink = StoppingSink::new(&shutdown_tx, 1);
        let clock = ManualClock::at(START_SECS);

        Bridge::new(&source, &sink, &clock, &config)
            .run(&mut shutdown_rx)
            .await?;

        let windows: Vec<TimeWindow> = source.queries().into_iter().map(|(_, window)| window).collect();
        let expected = vec![
            TimeWindow::new(985_560, 1_000_080),
            TimeWindow::new(985_560, 1_000_080),
        ];
        if windows != expected {
            return Err(AppError::validation(format!("Unexpected windows {:?}", windows)));
        }
        if sink.submitted().len() != 1 {
            return Err(AppError::validation("Expected the retried iteration to submit"));
        }
        Ok(())
    })
}

#[test]
fn long_outage_keeps_window_within_initial_lookback() -> AppResult<()> {
    run_async_test(async {
        let config = test_config(FailurePolicy::Continue)?;
        // 2_000 failures at 20s apart outlast the 4h lookback
        let source = FakeSource::new(&["requests_total"]).failing_queries(2_000);
        let (shutdown_tx, mut shutdown_rx) = shutdown_channel();
        let sink = StoppingSink::new(&shutdown_tx, 1);
        let clock = ManualClock::at(START_SECS);

        Bridge::new(&source, &sink, &clock, &config)
            .run(&mut shutdown_rx)
            .await?;

        let step_secs = i64::try_from(config.schedule.step.get())
            .map_err(|err| AppError::validation(format!("step conversion failed: {}", err)))?;
        let limit = i64::try_from(config.schedule.initial_window.as_secs())
            .map_err(|err| AppError::validation(format!("window conversion failed: {}", err)))?
            .saturating_add(step_secs.saturating_mul(2));
        let windows: Vec<TimeWindow> = source.queries().into_iter().map(|(_, window)| window).collect();
        if windows.len() != 2_001 {
            return Err(AppError::validation(format!("Unexpected query count {}", windows.len())));
        }
        if let Some(window) = windows
            .iter()
            .find(|window| window.end.saturating_sub(window.start) > limit)
        {
            return Err(AppError::validation(format!("Window {:?} exceeds {}s", window, limit)));
        }
        let last_start = windows.last().map_or(0, |window| window.start);
        if last_start <= 985_560 {
            return Err(AppError::validation(format!("Window start never moved: {}", last_start)));
        }
        if sink.submitted().len() != 1 {
            return Err(AppError::validation("Expected a submission once the source recovered"));
        }
        Ok(())
    })
}

#[test]
fn failed_iteration_surfaces_under_exit() -> AppResult<()> {
    run_async_test(async {
        let config = test_config(FailurePolicy::Exit)?;
        let source = FakeSource::new(&["requests_total"]).failing_queries(1);
        let (shutdown_tx, mut shutdown_rx) = shutdown_channel();
        let sink = StoppingSink::new(&shutdown_tx, 1);
        let clock = ManualClock::at(START_SECS);

        let result = Bridge::new(&source, &sink, &clock, &config)
            .run(&mut shutdown_rx)
            .await;
        if !matches!(
            result,
            Err(AppError::Protocol(ProtocolError::UnexpectedResultType { .. }))
        ) {
            return Err(AppError::validation("Expected the protocol error to surface"));
        }
        if !sink.submitted().is_empty() {
            return Err(AppError::validation("Expected nothing to be submitted"));
        }
        Ok(())
    })
}

#[test]
fn startup_listing_is_retried_under_continue() -> AppResult<()> {
    run_async_test(async {
        let config = test_config(FailurePolicy::Continue)?;
        let source = FakeSource::new(&["requests_total"]).failing_names(2);
        let (shutdown_tx, mut shutdown_rx) = shutdown_channel();
        let sink = StoppingSink::new(&shutdown_tx, 1);
        let clock = ManualClock::at(START_SECS);

        Bridge::new(&source, &sink, &clock, &config)
            .run(&mut shutdown_rx)
            .await?;

        if sink.submitted().len() != 1 {
            return Err(AppError::validation("Expected polling after startup recovered"));
        }
        // two failed listings, then one poll interval after the submission
        if clock.sleeps().len() != 3 {
            return Err(AppError::validation(format!("Unexpected sleeps {:?}", clock.sleeps())));
        }
        Ok(())
    })
}

#[test]
fn pending_shutdown_stops_before_any_call() -> AppResult<()> {
    run_async_test(async {
        let config = test_config(FailurePolicy::Continue)?;
        let source = FakeSource::new(&["requests_total"]);
        let (shutdown_tx, mut shutdown_rx) = shutdown_channel();
        let sink = StoppingSink::new(&shutdown_tx, 1);
        let clock = ManualClock::at(START_SECS);
        if shutdown_tx.send(()).is_err() {
            return Err(AppError::validation("Failed to send shutdown"));
        }

        let termination = Bridge::new(&source, &sink, &clock, &config)
            .run(&mut shutdown_rx)
            .await?;
        if termination != Termination::Interrupted || !source.queries().is_empty() {
            return Err(AppError::validation("Expected an immediate stop"));
        }
        Ok(())
    })
}

#[test]
fn rejected_responses_are_counted() -> AppResult<()> {
    run_async_test(async {
        let config = test_config(FailurePolicy::Continue)?;
        let source = FakeSource::new(&["requests_total", "latency_bucket"]);
        let (shutdown_tx, _shutdown_rx) = shutdown_channel();
        let mut sink = StoppingSink::new(&shutdown_tx, usize::MAX);
        sink.response = IntakeResponse {
            errors: vec!["Point timestamp is too old".to_owned()],
        };
        let clock = ManualClock::at(START_SECS);
        let catalog =
            MetricCatalog::classify(["requests_total", "latency_bucket"], None);

        let report = Bridge::new(&source, &sink, &clock, &config)
            .iterate(&catalog, TimeWindow::new(960, 1_080))
            .await?;
        if report.counter_series != 1 || report.histogram_series != 1 || report.rejected_responses != 1
        {
            return Err(AppError::validation(format!("Unexpected report {:?}", report)));
        }
        Ok(())
    })
}
