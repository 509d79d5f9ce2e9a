//! Dispatcher error types

use thiserror::Error;

/// Dispatcher-specific errors
///
/// Per-event failures are not errors here; they resolve as `DispatchOutcome::Failure`.
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Transport construction error
    #[error("failed to build transport for '{endpoint}': {message}")]
    TransportBuild { endpoint: String, message: String },

    /// Invalid input (from contract)
    #[error("invalid review: {0}")]
    Contract(#[from] contracts::ContractError),
}

impl DispatcherError {
    /// Create a transport build error
    pub fn transport_build(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TransportBuild {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }
}
