//! Dispatch contract - how the request layer hands review events to the dispatcher

use std::future::Future;

use thiserror::Error;

use crate::ReviewEvent;

/// Why a logical dispatch (or one of its attempts) failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// Connection refused, DNS failure, timeout, pool exhausted or closed
    #[error("transport error: {message}")]
    Transport { message: String },

    /// Producer answered with a status other than 200/201
    #[error("producer rejected event with status {status}: {body}")]
    RemoteRejected { status: u16, body: String },

    /// Cancelled by the caller (abandoned request, handler timeout)
    #[error("dispatch cancelled")]
    Cancelled,

    /// Client is stopping or stopped
    #[error("dispatch client is shutting down")]
    ShutdownInProgress,

    /// Event could not be encoded
    #[error("failed to serialize event: {message}")]
    Serialization { message: String },
}

impl DispatchError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn remote_rejected(status: u16, body: impl Into<String>) -> Self {
        Self::RemoteRejected {
            status,
            body: body.into(),
        }
    }

    /// Only transport failures and remote rejections are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::RemoteRejected { .. })
    }
}

/// Final result of one logical dispatch, inclusive of all retries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Success,
    Failure(DispatchError),
}

impl DispatchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Failure cause, if any
    pub fn error(&self) -> Option<&DispatchError> {
        match self {
            Self::Success => None,
            Self::Failure(e) => Some(e),
        }
    }
}

/// A dispatch in flight
///
/// Resolves exactly once. `cancel` is idempotent and has no effect after resolution.
pub trait PendingDispatch: Future<Output = DispatchOutcome> + Send + Unpin + 'static {
    fn cancel(&self);
}

/// Sink for review events (implemented by the dispatch client)
///
/// `publish` must return without waiting on any I/O.
pub trait ReviewPublisher: Send + Sync + 'static {
    type Pending: PendingDispatch;

    fn publish(&self, event: ReviewEvent) -> Self::Pending;
}
