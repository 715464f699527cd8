//! Bounded retry with randomized exponential backoff around network calls.
use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::args::{PositiveU64, PositiveUsize};
use crate::clock::Clock;
use crate::error::AppResult;

pub const DEFAULT_MAX_ATTEMPTS: usize = 5;
pub const DEFAULT_MULTIPLIER: u64 = 2;
pub const DEFAULT_MIN_DELAY: Duration = Duration::from_secs(5);
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);

/// Backoff base for the exponential schedule.
const EXPONENT_BASE: u64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: PositiveUsize,
    multiplier: PositiveU64,
    min_delay: Duration,
    max_delay: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub const fn new(
        max_attempts: PositiveUsize,
        multiplier: PositiveU64,
        min_delay: Duration,
        max_delay: Duration,
    ) -> Self {
        Self {
            max_attempts,
            multiplier,
            min_delay,
            max_delay,
        }
    }

    /// A policy that never retries.
    #[must_use]
    pub fn single_attempt() -> Self {
        Self {
            max_attempts: PositiveUsize::ONE,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn max_attempts(&self) -> usize {
        self.max_attempts.get()
    }

    /// Upper bound of the wait after the given (1-based) failed attempt:
    /// `multiplier * 2^(attempt - 1)` seconds, clamped to `[min, max]`.
    #[must_use]
    pub fn ceiling(&self, attempt: usize) -> Duration {
        let exponent = u32::try_from(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        let secs = EXPONENT_BASE
            .checked_pow(exponent)
            .and_then(|factor| factor.checked_mul(self.multiplier.get()))
            .unwrap_or(u64::MAX);
        Duration::from_secs(secs)
            .min(self.max_delay)
            .max(self.min_delay)
    }

    /// Randomized wait drawn uniformly from `[min, ceiling]`.
    pub fn delay<R>(&self, attempt: usize, rng: &mut R) -> Duration
    where
        R: Rng + ?Sized,
    {
        let ceiling = self.ceiling(attempt);
        if ceiling <= self.min_delay {
            return ceiling;
        }
        rng.gen_range(self.min_delay..=ceiling)
    }

    /// Runs `call` until it succeeds, fails with a non-retryable error, or the
    /// attempt budget is spent. The last error is returned on exhaustion.
    ///
    /// # Errors
    ///
    /// Returns the error of the final attempt.
    pub async fn run<T, F, Fut>(&self, clock: &dyn Clock, operation: &str, mut call: F) -> AppResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let mut attempt: usize = 1;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(err) if !err.is_retryable() || attempt >= self.max_attempts() => {
                    return Err(err);
                }
                Err(err) => {
                    let delay = self.delay(attempt, &mut rand::thread_rng());
                    tracing::warn!(
                        "Retrying {} after {} error (attempt {}/{}, waiting {:?}): {}",
                        operation,
                        err.kind(),
                        attempt,
                        self.max_attempts(),
                        delay,
                        err
                    );
                    clock.sleep(delay).await;
                    attempt = attempt.saturating_add(1);
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: PositiveUsize::try_from(DEFAULT_MAX_ATTEMPTS).unwrap_or(PositiveUsize::ONE),
            multiplier: PositiveU64::try_from(DEFAULT_MULTIPLIER).unwrap_or(PositiveU64::ONE),
            min_delay: DEFAULT_MIN_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use reqwest::StatusCode;

    use super::*;
    use crate::clock::ManualClock;
    use crate::error::{AppError, FetchError, ProtocolError};

    fn run_async_test<F>(future: F) -> AppResult<()>
    where
        F: Future<Output = AppResult<()>>,
    {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(future)
    }

    fn unavailable() -> AppError {
        AppError::fetch(FetchError::Status {
            endpoint: "http://prom.test".to_owned(),
            status: StatusCode::SERVICE_UNAVAILABLE,
        })
    }

    #[test]
    fn ceiling_grows_exponentially_within_bounds() -> AppResult<()> {
        let policy = RetryPolicy::default();
        let expected = [5_u64, 5, 8, 16, 32, 60, 60];
        for (index, secs) in expected.iter().enumerate() {
            let attempt = index.saturating_add(1);
            let ceiling = policy.ceiling(attempt);
            if ceiling != Duration::from_secs(*secs) {
                return Err(AppError::validation(format!(
                    "attempt {} ceiling {:?}, expected {}s",
                    attempt, ceiling, secs
                )));
            }
        }
        if policy.ceiling(500) != DEFAULT_MAX_DELAY {
            return Err(AppError::validation("Expected overflow to clamp to max"));
        }
        Ok(())
    }

    #[test]
    fn delay_stays_between_min_and_ceiling() -> AppResult<()> {
        let policy = RetryPolicy::default();
        let mut rng = rand::thread_rng();
        for attempt in 1..=8 {
            for _ in 0..50 {
                let delay = policy.delay(attempt, &mut rng);
                if delay < DEFAULT_MIN_DELAY || delay > policy.ceiling(attempt) {
                    return Err(AppError::validation(format!(
                        "delay {:?} out of range for attempt {}",
                        delay, attempt
                    )));
                }
            }
        }
        Ok(())
    }

    #[test]
    fn retries_transient_errors_until_success() -> AppResult<()> {
        run_async_test(async {
            let clock = ManualClock::at(0);
            let calls = AtomicUsize::new(0);
            let counter = &calls;
            let value = RetryPolicy::default()
                .run(&clock, "query_range", move || async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(unavailable())
                    } else {
                        Ok(42_u32)
                    }
                })
                .await?;
            if value != 42 || calls.load(Ordering::SeqCst) != 3 {
                return Err(AppError::validation("Expected success on the third call"));
            }
            if clock.sleeps().len() != 2 {
                return Err(AppError::validation(format!(
                    "Expected two backoff sleeps, got {:?}",
                    clock.sleeps()
                )));
            }
            Ok(())
        })
    }

    #[test]
    fn exhaustion_returns_last_error() -> AppResult<()> {
        run_async_test(async {
            let clock = ManualClock::at(0);
            let calls = AtomicUsize::new(0);
            let counter = &calls;
            let result: AppResult<()> = RetryPolicy::default()
                .run(&clock, "submit_metrics", move || async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(unavailable())
                })
                .await;
            if !matches!(result, Err(AppError::Fetch(FetchError::Status { .. }))) {
                return Err(AppError::validation("Expected the fetch error to surface"));
            }
            if calls.load(Ordering::SeqCst) != DEFAULT_MAX_ATTEMPTS {
                return Err(AppError::validation("Expected every attempt to be used"));
            }
            if clock.sleeps().len() != DEFAULT_MAX_ATTEMPTS.saturating_sub(1) {
                return Err(AppError::validation("Expected no sleep after the last attempt"));
            }
            Ok(())
        })
    }

    #[test]
    fn protocol_errors_are_not_retried() -> AppResult<()> {
        run_async_test(async {
            let clock = ManualClock::at(0);
            let calls = AtomicUsize::new(0);
            let counter = &calls;
            let result: AppResult<()> = RetryPolicy::default()
                .run(&clock, "query_range", move || async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(AppError::protocol(ProtocolError::MissingData))
                })
                .await;
            if result.is_ok() || calls.load(Ordering::SeqCst) != 1 {
                return Err(AppError::validation("Expected a single attempt"));
            }
            if !clock.sleeps().is_empty() {
                return Err(AppError::validation("Expected no sleeps"));
            }
            Ok(())
        })
    }
}
