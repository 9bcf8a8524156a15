//! Retry policy with exponential backoff and jitter.

use std::time::Duration;

use cognima_core::{RetrievalError, RetrievalResult};
use rand::Rng;

/// How the transport engine retries transient failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt. Zero disables retrying.
    pub max_retries: u32,
    /// Delay before the first retry. Doubles on each subsequent retry.
    pub base_delay: Duration,
    /// Upper bound on any single backoff sleep.
    pub max_delay: Duration,
    /// Random spread applied to each delay, as a percentage (0-100).
    pub jitter_percent: u8,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            jitter_percent: 20,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(1),
            jitter_percent: 0,
        }
    }

    #[must_use]
    pub const fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    #[must_use]
    pub const fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    #[must_use]
    pub const fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    #[must_use]
    pub const fn with_jitter_percent(mut self, percent: u8) -> Self {
        self.jitter_percent = percent;
        self
    }

    /// Check the policy is usable.
    pub fn validate(&self) -> RetrievalResult<()> {
        if self.base_delay.is_zero() {
            return Err(RetrievalError::configuration(
                "retry.base_delay",
                "must be greater than zero",
            ));
        }
        if self.max_delay < self.base_delay {
            return Err(RetrievalError::configuration(
                "retry.max_delay",
                "must not be shorter than base_delay",
            ));
        }
        if self.jitter_percent > 100 {
            return Err(RetrievalError::configuration(
                "retry.jitter_percent",
                "must be between 0 and 100",
            ));
        }
        Ok(())
    }

    /// Total attempts a call may make.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Backoff before retry number `retry` (1-based), without jitter.
    #[must_use]
    pub fn backoff(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(2u32.pow(exponent))
            .min(self.max_delay)
    }

    /// Backoff before retry number `retry` with jitter applied, capped at `max_delay`.
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        jitter(self.backoff(retry), self.jitter_percent).min(self.max_delay)
    }
}

/// Spread `base` uniformly by up to `percent` in either direction.
fn jitter(base: Duration, percent: u8) -> Duration {
    if percent == 0 || base.is_zero() {
        return base;
    }
    let base_ms = u64::try_from(base.as_millis()).unwrap_or(u64::MAX);
    let spread = base_ms.saturating_mul(u64::from(percent.min(100))) / 100;
    let low = base_ms.saturating_sub(spread);
    let high = base_ms.saturating_add(spread);
    Duration::from_millis(rand::rng().random_range(low..=high))
}
