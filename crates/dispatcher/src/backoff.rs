//! Backoff policy: attempt number -> delay before the next attempt

use std::time::Duration;

use contracts::RetryConfig;

/// Default attempts per logical dispatch, including the first
pub const MAX_RETRIES: u32 = 3;

/// Default base delay
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(100);

/// Exponent cap; keeps `2^attempt` inside u32
const MAX_EXPONENT: u32 = 20;

/// `2^attempt * base`, saturating
///
/// `attempt` is the 1-indexed number of the attempt that just failed, so the
/// delay before attempt 2 is `2 * base` and before attempt 3 is `4 * base`.
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let exponent = attempt.min(MAX_EXPONENT);
    base.saturating_mul(1u32 << exponent)
}

/// Retry budget plus delay schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    base: Duration,
    max_attempts: u32,
}

impl BackoffPolicy {
    /// `max_attempts` is clamped to at least 1
    pub fn new(base: Duration, max_attempts: u32) -> Self {
        Self {
            base,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.base_delay(), config.max_attempts)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn base(&self) -> Duration {
        self.base
    }

    /// Delay to wait after `attempt` failed
    pub fn delay(&self, attempt: u32) -> Duration {
        backoff_delay(self.base, attempt)
    }

    /// Whether another attempt may follow `attempt`
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_DELAY, MAX_RETRIES)
    }
}
