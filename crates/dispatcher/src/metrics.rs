//! Dispatch counters for observability

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use observability::StatsGauges;

/// Process-wide dispatch counters
///
/// `sent` counts logical dispatches; `succeeded` and `failed` count attempts,
/// so `succeeded + failed` can exceed `sent` when retries happen.
#[derive(Debug, Default)]
pub struct DispatchCounters {
    /// Logical dispatches requested
    sent: AtomicU64,
    /// Attempts answered with 200/201
    succeeded: AtomicU64,
    /// Failed attempts, plus cancelled/rejected dispatches
    failed: AtomicU64,
}

impl DispatchCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }

    /// Increment sent count, returning the new value
    pub fn inc_sent(&self) -> u64 {
        self.sent.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn succeeded(&self) -> u64 {
        self.succeeded.load(Ordering::Relaxed)
    }

    pub fn inc_succeeded(&self) {
        self.succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn inc_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all counters
    ///
    /// Each field is read independently; the snapshot is not atomic as a whole.
    pub fn snapshot(&self) -> CountersSnapshot {
        CountersSnapshot {
            sent: self.sent(),
            succeeded: self.succeeded(),
            failed: self.failed(),
        }
    }
}

/// Snapshot of dispatch counters (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountersSnapshot {
    pub sent: u64,
    pub succeeded: u64,
    pub failed: u64,
}

impl CountersSnapshot {
    /// `succeeded * 100 / sent`, truncated; 0 when nothing was sent
    ///
    /// Can exceed 100 when retried dispatches succeed.
    pub fn success_rate(&self) -> u64 {
        if self.sent == 0 {
            0
        } else {
            self.succeeded.saturating_mul(100) / self.sent
        }
    }
}

impl fmt::Display for CountersSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Sent: {}, Success: {}, Failed: {}, Success Rate: {}%",
            self.sent,
            self.succeeded,
            self.failed,
            self.success_rate()
        )
    }
}

impl From<CountersSnapshot> for StatsGauges {
    fn from(s: CountersSnapshot) -> Self {
        StatsGauges {
            sent: s.sent,
            succeeded: s.succeeded,
            failed: s.failed,
            success_rate: s.success_rate(),
        }
    }
}
