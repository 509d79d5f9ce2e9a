//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// No configuration file could be loaded
    #[error("No usable configuration file: {message}")]
    ConfigNotFound { message: String },

    /// Configuration validation error (after CLI overrides)
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String },

    /// Listener bind error
    #[error("Failed to bind HTTP listener on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn config_not_found(message: impl Into<String>) -> Self {
        Self::ConfigNotFound {
            message: message.into(),
        }
    }

    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    pub fn bind(addr: impl Into<String>, source: std::io::Error) -> Self {
        Self::Bind {
            addr: addr.into(),
            source,
        }
    }
}
