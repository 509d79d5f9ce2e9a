//! # Dispatcher
//!
//! Review event dispatch to the producer service.
//!
//! Responsible for:
//! - Serializing `ReviewEvent`s and POSTing them over a pooled transport
//! - Retrying failed attempts with exponential backoff, bounded by a retry budget
//! - Resolving one `DispatchOutcome` per event without blocking the caller
//! - Process-wide sent/succeeded/failed counters and a periodic stats reporter
//! - Lifecycle: start on construction, bounded graceful shutdown on `close`

pub mod backoff;
pub mod client;
pub mod error;
pub mod handle;
pub mod metrics;
pub mod mock;
pub mod reporter;
pub mod transport;

pub use backoff::{backoff_delay, BackoffPolicy, MAX_RETRIES};
pub use client::{DispatchClient, DispatchSettings, LifecycleState};
pub use contracts::{DispatchError, DispatchOutcome, ReviewEvent, ReviewType};
pub use error::DispatcherError;
pub use handle::DispatchHandle;
pub use metrics::{CountersSnapshot, DispatchCounters};
pub use mock::{ScriptedReply, ScriptedTransport};
pub use reporter::StatsReporter;
pub use transport::{HttpTransport, Transport, TransportResponse};
