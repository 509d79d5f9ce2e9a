//! StatsReporter - periodic counter report on its own task

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::metrics::{CountersSnapshot, DispatchCounters};

/// Handle to a running stats reporter task
pub struct StatsReporter {
    /// Stop signal for the report loop
    shutdown: CancellationToken,
    /// Number of reports emitted so far
    emitted: Arc<AtomicU64>,
    /// Reporter task handle
    task: JoinHandle<()>,
}

impl StatsReporter {
    /// Spawn the reporter; the first report fires one `interval` from now
    pub fn spawn(counters: Arc<DispatchCounters>, interval: Duration) -> Self {
        let shutdown = CancellationToken::new();
        let emitted = Arc::new(AtomicU64::new(0));

        let task = tokio::spawn(report_loop(
            counters,
            interval,
            shutdown.clone(),
            Arc::clone(&emitted),
        ));

        Self {
            shutdown,
            emitted,
            task,
        }
    }

    /// Reports emitted so far (ticks with `sent == 0` are skipped)
    pub fn reports_emitted(&self) -> u64 {
        self.emitted.load(Ordering::Relaxed)
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Signal the loop to stop without waiting for it
    pub fn signal_stop(&self) {
        self.shutdown.cancel();
    }

    /// Stop the loop and join it, waiting at most `grace`
    ///
    /// Returns false if the task had to be aborted.
    #[instrument(name = "stats_reporter_shutdown", skip(self))]
    pub async fn shutdown(self, grace: Duration) -> bool {
        self.shutdown.cancel();
        let mut task = self.task;

        match tokio::time::timeout(grace, &mut task).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                error!(error = %e, "Stats reporter task failed");
                true
            }
            Err(_) => {
                warn!(grace_ms = grace.as_millis() as u64, "Stats reporter did not stop in time, aborting");
                task.abort();
                false
            }
        }
    }
}

/// Report loop
async fn report_loop(
    counters: Arc<DispatchCounters>,
    interval: Duration,
    shutdown: CancellationToken,
    emitted: Arc<AtomicU64>,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    debug!(interval_ms = interval.as_millis() as u64, "Stats reporter started");

    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {
                if let Some(snapshot) = report_once(&counters) {
                    emitted.fetch_add(1, Ordering::Relaxed);
                    info!(
                        sent = snapshot.sent,
                        succeeded = snapshot.succeeded,
                        failed = snapshot.failed,
                        success_rate = snapshot.success_rate(),
                        "Producer stats: {snapshot}"
                    );
                }
            }
        }
    }

    debug!("Stats reporter stopped");
}

/// Take a snapshot and export it; None when nothing has been sent yet
fn report_once(counters: &DispatchCounters) -> Option<CountersSnapshot> {
    let snapshot = counters.snapshot();
    if snapshot.sent == 0 {
        return None;
    }
    observability::record_stats_snapshot(snapshot.into());
    Some(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_once_skips_idle() {
        let counters = DispatchCounters::new();
        assert!(report_once(&counters).is_none());

        counters.inc_sent();
        counters.inc_succeeded();
        let snapshot = report_once(&counters).unwrap();
        assert_eq!(snapshot.success_rate(), 100);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reports_only_after_first_send() {
        let counters = Arc::new(DispatchCounters::new());
        let reporter = StatsReporter::spawn(Arc::clone(&counters), Duration::from_secs(5));

        tokio::time::sleep(Duration::from_millis(10_500)).await;
        assert_eq!(reporter.reports_emitted(), 0);

        counters.inc_sent();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(reporter.reports_emitted(), 1);

        assert!(reporter.shutdown(Duration::from_secs(2)).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_is_prompt() {
        let counters = Arc::new(DispatchCounters::new());
        let reporter = StatsReporter::spawn(counters, Duration::from_secs(5));

        let started = Instant::now();
        assert!(reporter.shutdown(Duration::from_secs(2)).await);
        assert!(started.elapsed() < Duration::from_secs(2));
    }
}
