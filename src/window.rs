//! Query window arithmetic for the poll loop.
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::args::PositiveU64;

/// `[start, end]` in Unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: i64,
    pub end: i64,
}

impl TimeWindow {
    #[must_use]
    pub const fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Window reaching `lookback` into the past from `now`.
    #[must_use]
    pub fn ending_at(now: DateTime<Utc>, lookback: Duration) -> Self {
        let end = now.timestamp();
        Self {
            start: end.saturating_sub(duration_secs(lookback)),
            end,
        }
    }

    /// Snaps both bounds onto step boundaries, padding one step on each side
    /// so samples sitting on the original bounds are always included.
    #[must_use]
    pub fn aligned(self, step: PositiveU64) -> Self {
        let step = i64::try_from(step.get()).unwrap_or(i64::MAX);
        let start = self
            .start
            .div_euclid(step)
            .saturating_sub(1)
            .saturating_mul(step);
        let end = self
            .end
            .div_euclid(step)
            .saturating_add(1)
            .saturating_mul(step);
        Self { start, end }
    }

    /// Next window: re-covers `overlap` before the previous end to pick up
    /// late-arriving samples, and reaches up to `now`.
    #[must_use]
    pub fn advanced(self, now: DateTime<Utc>, overlap: Duration) -> Self {
        Self {
            start: self.end.saturating_sub(duration_secs(overlap)),
            end: now.timestamp(),
        }
    }

    /// Extends the end to `now` and keeps the start, but never reaches
    /// further back than `max_lookback`; older gaps are given up.
    #[must_use]
    pub fn extended(self, now: DateTime<Utc>, max_lookback: Duration) -> Self {
        let end = now.timestamp().max(self.end);
        Self {
            start: self.start.max(end.saturating_sub(duration_secs(max_lookback))),
            end,
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (
            DateTime::<Utc>::from_timestamp(self.start, 0),
            DateTime::<Utc>::from_timestamp(self.end, 0),
        ) {
            (Some(start), Some(end)) => write!(f, "{} to {}", start.to_rfc3339(), end.to_rfc3339()),
            _ => write!(f, "{} to {}", self.start, self.end),
        }
    }
}

fn duration_secs(duration: Duration) -> i64 {
    i64::try_from(duration.as_secs()).unwrap_or(i64::MAX)
}
