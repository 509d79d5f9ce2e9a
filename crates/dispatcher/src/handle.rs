//! DispatchHandle - caller's side of one logical dispatch

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use contracts::{DispatchError, DispatchOutcome, PendingDispatch};

/// Handle to a dispatch in flight
///
/// - Awaiting it yields the single `DispatchOutcome`
/// - `cancel` stops further attempts; the outcome then resolves as `Cancelled`
/// - Dropping an unresolved handle cancels the dispatch, unless `detach`ed
pub struct DispatchHandle {
    rx: oneshot::Receiver<DispatchOutcome>,
    cancel: CancellationToken,
    /// Cancel on drop
    armed: bool,
    resolved: bool,
}

impl DispatchHandle {
    pub(crate) fn new(rx: oneshot::Receiver<DispatchOutcome>, cancel: CancellationToken) -> Self {
        Self {
            rx,
            cancel,
            armed: true,
            resolved: false,
        }
    }

    /// Handle that is already resolved
    pub(crate) fn ready(outcome: DispatchOutcome) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(outcome);
        Self::new(rx, CancellationToken::new())
    }

    /// Request cancellation (idempotent, no effect once resolved)
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Let the dispatch run to completion without anyone awaiting it
    pub fn detach(mut self) {
        self.armed = false;
    }
}

impl Future for DispatchHandle {
    type Output = DispatchOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(result) => {
                self.resolved = true;
                // Sender gone without an outcome: the task was torn down by shutdown
                Poll::Ready(
                    result.unwrap_or(DispatchOutcome::Failure(DispatchError::ShutdownInProgress)),
                )
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl PendingDispatch for DispatchHandle {
    fn cancel(&self) {
        DispatchHandle::cancel(self);
    }
}

impl Drop for DispatchHandle {
    fn drop(&mut self) {
        if self.armed && !self.resolved {
            self.cancel.cancel();
        }
    }
}

impl std::fmt::Debug for DispatchHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchHandle")
            .field("cancelled", &self.cancel.is_cancelled())
            .field("resolved", &self.resolved)
            .finish()
    }
}
