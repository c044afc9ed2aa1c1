//! Pacing between outbound calls.
//!
//! The scanner acquires the limiter once per candidate. The fixed-interval
//! limiter guarantees at least `interval` between successive grants; the
//! first grant is immediate.

use crate::clock::{elapsed_between, Clock, Sleeper};
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

pub trait RateLimiter: Send + Sync {
    /// Block until the next call may proceed.
    fn acquire(&self);
}

/// Minimum spacing between grants, measured on the injected clock.
pub struct FixedIntervalLimiter {
    interval: Duration,
    last: Mutex<Option<DateTime<Utc>>>,
    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn Sleeper>,
}

impl FixedIntervalLimiter {
    pub fn new(interval: Duration, clock: Arc<dyn Clock>, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            interval,
            last: Mutex::new(None),
            clock,
            sleeper,
        }
    }
}

impl RateLimiter for FixedIntervalLimiter {
    fn acquire(&self) {
        // Held across the sleep so concurrent callers queue up.
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(prev) = *last {
            let waited = elapsed_between(prev, self.clock.now());
            if waited < self.interval {
                self.sleeper.sleep(self.interval - waited);
            }
        }
        *last = Some(self.clock.now());
    }
}

impl std::fmt::Debug for FixedIntervalLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixedIntervalLimiter")
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

/// No pacing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unthrottled;

impl RateLimiter for Unthrottled {
    fn acquire(&self) {}
}
