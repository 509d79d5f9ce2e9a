//! DispatchClient - asynchronous review event dispatch with retry and lifecycle
//!
//! ## 投递模型
//! - `dispatch` 立即返回 `DispatchHandle`，实际投递在独立任务中执行
//! - 每次尝试失败后按 `2^attempt * base` 退避，最多 `max_attempts` 次
//! - 调用方取消 / 客户端关闭会在下一个 await 点中止投递
//!
//! ## 生命周期
//! `Created -> Started -> Running -> Stopping -> Stopped`，`close` 幂等。

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, instrument, warn};

use contracts::{
    AppConfig, DispatchError, DispatchOutcome, ReviewEvent, ReviewPublisher, ReviewType,
};
use observability::{record_dispatch_attempt, record_dispatch_outcome};

use crate::backoff::BackoffPolicy;
use crate::error::DispatcherError;
use crate::handle::DispatchHandle;
use crate::metrics::{CountersSnapshot, DispatchCounters};
use crate::reporter::StatsReporter;
use crate::transport::{HttpTransport, Transport};

/// Log every Nth dispatch at debug level
const LOG_INTERVAL: u64 = 100;

/// Client lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LifecycleState {
    /// Constructed, nothing running yet
    Created = 0,
    /// Transport ready, reporter starting
    Started = 1,
    /// Accepting dispatches
    Running = 2,
    /// `close` in progress; new dispatches are rejected
    Stopping = 3,
    /// Reporter joined, transport released
    Stopped = 4,
}

impl LifecycleState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Created,
            1 => Self::Started,
            2 => Self::Running,
            3 => Self::Stopping,
            _ => Self::Stopped,
        }
    }
}

/// Client tuning that is not transport-specific
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSettings {
    pub backoff: BackoffPolicy,
    pub stats_interval: Duration,
    /// Upper bound on each join during `close`
    pub shutdown_grace: Duration,
}

impl DispatchSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            backoff: BackoffPolicy::from_config(&config.retry),
            stats_interval: config.stats.interval(),
            shutdown_grace: config.stats.shutdown_grace(),
        }
    }
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            backoff: BackoffPolicy::default(),
            stats_interval: Duration::from_secs(5),
            shutdown_grace: Duration::from_secs(2),
        }
    }
}

/// One attempt of a logical dispatch
struct Attempt {
    number: u32,
    started_at: Instant,
}

impl Attempt {
    fn start(number: u32) -> Self {
        Self {
            number,
            started_at: Instant::now(),
        }
    }

    fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

/// State shared between the client and its dispatch tasks
struct ClientInner<T> {
    transport: T,
    counters: Arc<DispatchCounters>,
    backoff: BackoffPolicy,
    state: AtomicU8,
    /// Cancelled once by `close`; observed by every dispatch task
    shutdown: CancellationToken,
    tasks: TaskTracker,
}

impl<T> ClientInner<T> {
    fn state(&self) -> LifecycleState {
        LifecycleState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: LifecycleState) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Count and report a dispatch that ended without an accepted attempt
    fn fail(&self, cause: DispatchError, attempts: u32, label: &'static str) -> DispatchOutcome {
        self.counters.inc_failed();
        record_dispatch_outcome(label, attempts);
        debug!(attempts, reason = %cause, "Dispatch aborted");
        DispatchOutcome::Failure(cause)
    }
}

impl<T: Transport + Sync> ClientInner<T> {
    /// Retry loop for one logical dispatch
    ///
    /// Cancellation is checked before every attempt and during every backoff sleep;
    /// an attempt in flight is dropped when cancellation fires.
    #[instrument(
        name = "dispatch",
        skip_all,
        fields(review_type = %event.review_type(), album_id = %event.album_id())
    )]
    async fn run(&self, event: ReviewEvent, cancel: CancellationToken) -> DispatchOutcome {
        let payload = match serde_json::to_vec(&event) {
            Ok(bytes) => Bytes::from(bytes),
            Err(e) => {
                let cause = DispatchError::Serialization {
                    message: e.to_string(),
                };
                return self.fail(cause, 0, "rejected");
            }
        };

        let mut number = 1;
        loop {
            let attempt = Attempt::start(number);

            let result = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => {
                    return self.fail(DispatchError::ShutdownInProgress, attempt.number, "shutdown");
                }
                _ = cancel.cancelled() => {
                    return self.fail(DispatchError::Cancelled, attempt.number, "cancelled");
                }
                result = self.transport.send(payload.clone()) => result,
            };

            let cause = match result {
                Ok(response) if response.is_accepted() => {
                    self.counters.inc_succeeded();
                    record_dispatch_attempt(true, attempt.elapsed());
                    record_dispatch_outcome("success", attempt.number);
                    debug!(attempt = attempt.number, status = response.status, "Review event delivered");
                    return DispatchOutcome::Success;
                }
                Ok(response) => DispatchError::remote_rejected(response.status, response.body),
                Err(e) => e,
            };

            self.counters.inc_failed();
            record_dispatch_attempt(false, attempt.elapsed());

            if !cause.is_retryable() || !self.backoff.should_retry(attempt.number) {
                warn!(attempts = attempt.number, error = %cause, "Dispatch failed");
                record_dispatch_outcome("exhausted", attempt.number);
                return DispatchOutcome::Failure(cause);
            }

            let delay = self.backoff.delay(attempt.number);
            warn!(
                attempt = attempt.number,
                delay_ms = delay.as_millis() as u64,
                error = %cause,
                "Dispatch attempt failed, retrying"
            );

            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => {
                    return self.fail(DispatchError::ShutdownInProgress, attempt.number, "shutdown");
                }
                _ = cancel.cancelled() => {
                    return self.fail(DispatchError::Cancelled, attempt.number, "cancelled");
                }
                _ = tokio::time::sleep(delay) => {}
            }

            number += 1;
        }
    }
}

/// Dispatch client
///
/// Cheap to share behind an `Arc`; every method takes `&self`.
pub struct DispatchClient<T = HttpTransport> {
    inner: Arc<ClientInner<T>>,
    reporter: Mutex<Option<StatsReporter>>,
    shutdown_grace: Duration,
}

impl DispatchClient<HttpTransport> {
    /// Build an HTTP-backed client from configuration and start it
    ///
    /// Must be called inside a tokio runtime.
    ///
    /// # Errors
    /// `TransportBuild` if the HTTP client cannot be configured.
    pub fn from_config(config: &AppConfig) -> Result<Self, DispatcherError> {
        let transport = HttpTransport::new(&config.producer)?;
        Ok(Self::new(transport, DispatchSettings::from_config(config)))
    }
}

impl<T: Transport + Sync + 'static> DispatchClient<T> {
    /// Start a client over `transport`
    ///
    /// Spawns the stats reporter, so it must be called inside a tokio runtime.
    pub fn new(transport: T, settings: DispatchSettings) -> Self {
        let endpoint = transport.endpoint().to_string();
        let inner = Arc::new(ClientInner {
            transport,
            counters: Arc::new(DispatchCounters::new()),
            backoff: settings.backoff,
            state: AtomicU8::new(LifecycleState::Created as u8),
            shutdown: CancellationToken::new(),
            tasks: TaskTracker::new(),
        });

        inner.set_state(LifecycleState::Started);
        let reporter = StatsReporter::spawn(Arc::clone(&inner.counters), settings.stats_interval);
        inner.set_state(LifecycleState::Running);

        info!(
            endpoint = %endpoint,
            max_attempts = settings.backoff.max_attempts(),
            "Dispatch client started"
        );

        Self {
            inner,
            reporter: Mutex::new(Some(reporter)),
            shutdown_grace: settings.shutdown_grace,
        }
    }

    /// Dispatch one event; returns immediately
    ///
    /// After `close` has begun the handle resolves to `ShutdownInProgress`
    /// without any attempt.
    pub fn dispatch(&self, event: ReviewEvent) -> DispatchHandle {
        self.spawn_dispatch(event, None)
    }

    /// Like `dispatch`, but cancelled automatically after `timeout`
    pub fn dispatch_with_timeout(&self, event: ReviewEvent, timeout: Duration) -> DispatchHandle {
        self.spawn_dispatch(event, Some(timeout))
    }

    /// Validate raw inputs, build the event and dispatch it
    ///
    /// # Errors
    /// `Contract` if `review_type` is not `like` / `dislike`.
    pub fn send_review(
        &self,
        review_type: &str,
        album_id: &str,
    ) -> Result<DispatchHandle, DispatcherError> {
        let review_type: ReviewType = review_type.parse()?;
        Ok(self.dispatch(ReviewEvent::new(review_type, album_id)))
    }

    fn spawn_dispatch(&self, event: ReviewEvent, timeout: Option<Duration>) -> DispatchHandle {
        let sent = self.inner.counters.inc_sent();

        if self.inner.state() != LifecycleState::Running {
            warn!(album_id = event.album_id(), "Dispatch rejected, client is not running");
            return DispatchHandle::ready(self.inner.fail(
                DispatchError::ShutdownInProgress,
                0,
                "shutdown",
            ));
        }

        if sent % LOG_INTERVAL == 0 {
            debug!(
                sent,
                review_type = %event.review_type(),
                album_id = event.album_id(),
                "Dispatching review event"
            );
        }

        let (tx, rx) = oneshot::channel();
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();
        let inner = Arc::clone(&self.inner);

        self.inner.tasks.spawn(async move {
            let outcome = match timeout {
                None => inner.run(event, task_cancel).await,
                Some(timeout) => {
                    let timer_cancel = task_cancel.clone();
                    let run = inner.run(event, task_cancel);
                    tokio::pin!(run);
                    tokio::select! {
                        outcome = &mut run => outcome,
                        _ = tokio::time::sleep(timeout) => {
                            timer_cancel.cancel();
                            run.await
                        }
                    }
                }
            };
            // Receiver may already be gone (caller stopped waiting)
            let _ = tx.send(outcome);
        });

        DispatchHandle::new(rx, cancel)
    }

    /// Stop the reporter, end in-flight dispatches, release the transport
    ///
    /// Idempotent; each join is bounded by the shutdown grace period.
    #[instrument(name = "dispatch_client_close", skip(self))]
    pub async fn close(&self) {
        if self
            .inner
            .state
            .compare_exchange(
                LifecycleState::Running as u8,
                LifecycleState::Stopping as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_err()
        {
            debug!(state = ?self.state(), "Close ignored, client is not running");
            return;
        }

        info!("Dispatch client stopping");

        let reporter = self
            .reporter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(reporter) = reporter {
            reporter.shutdown(self.shutdown_grace).await;
        }

        self.inner.shutdown.cancel();
        self.inner.tasks.close();
        if tokio::time::timeout(self.shutdown_grace, self.inner.tasks.wait())
            .await
            .is_err()
        {
            warn!(
                remaining = self.inner.tasks.len(),
                "In-flight dispatches did not finish within grace period"
            );
        }

        self.inner.transport.close();
        self.inner.set_state(LifecycleState::Stopped);

        info!(stats = %self.snapshot(), "Dispatch client stopped");
    }

    pub fn state(&self) -> LifecycleState {
        self.inner.state()
    }

    pub fn is_running(&self) -> bool {
        self.state() == LifecycleState::Running
    }

    pub fn counters(&self) -> &DispatchCounters {
        &self.inner.counters
    }

    pub fn snapshot(&self) -> CountersSnapshot {
        self.inner.counters.snapshot()
    }

    /// Dispatch tasks not yet finished
    pub fn in_flight(&self) -> usize {
        self.inner.tasks.len()
    }

    pub fn transport(&self) -> &T {
        &self.inner.transport
    }

    /// Whether the stats reporter task is still alive
    pub fn reporter_running(&self) -> bool {
        self.reporter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|r| !r.is_finished())
    }
}

impl<T: Transport + Sync + 'static> ReviewPublisher for DispatchClient<T> {
    type Pending = DispatchHandle;

    fn publish(&self, event: ReviewEvent) -> DispatchHandle {
        self.dispatch(event)
    }
}

impl<T> Drop for DispatchClient<T> {
    /// Best effort when `close` was never awaited: signal tasks, do not wait
    fn drop(&mut self) {
        self.inner.shutdown.cancel();
        let reporter = self
            .reporter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(reporter) = reporter {
            reporter.signal_stop();
        }
    }
}
