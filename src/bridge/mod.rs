//! The poll loop.
//!
//! `Startup` lists metric names once and opens the initial window.
//! `Polling` aligns the window, gathers counters then histograms, submits,
//! sleeps, and advances the window with overlap. Shutdown moves to
//! `Terminated` from any await point.
mod gather;

#[cfg(test)]
mod tests;

use crate::args::FailurePolicy;
use crate::clock::Clock;
use crate::config::BridgeConfig;
use crate::datadog::submit_series;
use crate::error::{AppError, AppResult};
use crate::ports::{MetricSource, SeriesSink};
use crate::query::MetricCatalog;
use crate::shutdown::{ShutdownReceiver, wait_for_shutdown};
use crate::transform::Transformer;
use crate::window::TimeWindow;

/// Why the loop stopped without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Interrupted,
}

/// Outcome of one successful polling iteration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IterationReport {
    pub counter_series: usize,
    pub histogram_series: usize,
    /// Submission responses that listed errors.
    pub rejected_responses: usize,
}

#[derive(Debug)]
enum LoopState {
    Startup,
    Polling(PollState),
    Terminated(Termination),
}

#[derive(Debug)]
struct PollState {
    catalog: MetricCatalog,
    window: TimeWindow,
    rejected_total: usize,
}

pub struct Bridge<'deps> {
    source: &'deps dyn MetricSource,
    sink: &'deps dyn SeriesSink,
    clock: &'deps dyn Clock,
    config: &'deps BridgeConfig,
    transformer: Transformer,
}

impl<'deps> Bridge<'deps> {
    #[must_use]
    pub fn new(
        source: &'deps dyn MetricSource,
        sink: &'deps dyn SeriesSink,
        clock: &'deps dyn Clock,
        config: &'deps BridgeConfig,
    ) -> Self {
        Self {
            source,
            sink,
            clock,
            config,
            transformer: Transformer::new(
                config.schedule.step,
                config.destination.metric_prefix.clone(),
            ),
        }
    }

    /// Runs until shutdown is broadcast, or until an error with the `exit`
    /// failure policy.
    ///
    /// # Errors
    ///
    /// Returns the failing iteration's error when the failure policy is
    /// `exit`.
    pub async fn run(&self, shutdown_rx: &mut ShutdownReceiver) -> AppResult<Termination> {
        let mut state = LoopState::Startup;
        loop {
            state = match state {
                LoopState::Terminated(termination) => {
                    tracing::info!("Poll loop stopped: {:?}", termination);
                    return Ok(termination);
                }
                current => tokio::select! {
                    biased;
                    () = wait_for_shutdown(shutdown_rx) => LoopState::Terminated(Termination::Interrupted),
                    next = self.advance(current) => next?,
                },
            };
        }
    }

    async fn advance(&self, state: LoopState) -> AppResult<LoopState> {
        match state {
            LoopState::Startup => self.startup().await,
            LoopState::Polling(poll) => self.poll(poll).await,
            LoopState::Terminated(termination) => Ok(LoopState::Terminated(termination)),
        }
    }

    async fn startup(&self) -> AppResult<LoopState> {
        let window = TimeWindow::ending_at(self.clock.now(), self.config.schedule.initial_window);
        tracing::info!("Listing metric names");
        let names = match self
            .config
            .retry
            .run(self.clock, "list_metric_names", || self.source.list_metric_names())
            .await
        {
            Ok(names) => names,
            Err(err) => {
                self.handle_failure(err).await?;
                return Ok(LoopState::Startup);
            }
        };

        let catalog = MetricCatalog::classify(names, self.config.metric_prefix.as_deref());
        tracing::info!(
            "Found {} counters and {} histograms",
            catalog.counters.len(),
            catalog.histograms.len()
        );
        if catalog.is_empty() {
            tracing::warn!("No metrics to republish; polling will submit nothing.");
        }
        Ok(LoopState::Polling(PollState {
            catalog,
            window,
            rejected_total: 0,
        }))
    }

    async fn poll(&self, poll: PollState) -> AppResult<LoopState> {
        let aligned = poll.window.aligned(self.config.schedule.step);
        match self.iterate(&poll.catalog, aligned).await {
            Ok(report) => {
                let rejected_total = poll
                    .rejected_total
                    .saturating_add(report.rejected_responses);
                tracing::info!(
                    "Submitted {} counter and {} histogram series for {}",
                    report.counter_series,
                    report.histogram_series,
                    aligned
                );
                if report.rejected_responses > 0 {
                    tracing::warn!(
                        "{} intake responses reported errors ({} since startup)",
                        report.rejected_responses,
                        rejected_total
                    );
                }
                self.clock.sleep(self.config.schedule.poll_interval).await;
                Ok(LoopState::Polling(PollState {
                    catalog: poll.catalog,
                    window: aligned.advanced(self.clock.now(), self.config.schedule.overlap_window),
                    rejected_total,
                }))
            }
            Err(err) => {
                self.handle_failure(err).await?;
                Ok(LoopState::Polling(PollState {
                    window: poll
                        .window
                        .extended(self.clock.now(), self.config.schedule.initial_window),
                    ..poll
                }))
            }
        }
    }

    /// One polling iteration over an aligned window.
    pub(crate) async fn iterate(
        &self,
        catalog: &MetricCatalog,
        window: TimeWindow,
    ) -> AppResult<IterationReport> {
        let mut series = self.gather_counters(&catalog.counters, window).await?;
        let counter_series = series.len();
        series.extend(self.gather_histograms(&catalog.histograms, window).await?);
        let histogram_series = series.len().saturating_sub(counter_series);

        let rejected = submit_series(
            self.sink,
            &series,
            self.config.chunk_size,
            &self.config.retry,
            self.clock,
        )
        .await?;
        for response in &rejected {
            tracing::warn!("Intake rejected part of a payload: {:?}", response.errors);
        }

        Ok(IterationReport {
            counter_series,
            histogram_series,
            rejected_responses: rejected.len(),
        })
    }

    /// Logs and sleeps under `continue`; hands the error back under `exit`.
    async fn handle_failure(&self, err: AppError) -> AppResult<()> {
        match self.config.on_failure {
            FailurePolicy::Exit => Err(err),
            FailurePolicy::Continue => {
                tracing::error!(
                    "Iteration failed ({}), retrying in {:?}: {}",
                    err.kind(),
                    self.config.schedule.poll_interval,
                    err
                );
                self.clock.sleep(self.config.schedule.poll_interval).await;
                Ok(())
            }
        }
    }
}
