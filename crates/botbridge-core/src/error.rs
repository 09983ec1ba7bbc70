//! Bridge error types.

use std::io;
use thiserror::Error;

/// Errors that can occur during bridge operations.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Unknown channel name.
    #[error("Unknown channel: {0}")]
    UnknownChannel(String),

    /// No adapter registered for a channel.
    #[error("No adapter for channel: {0}")]
    AdapterMissing(String),

    /// Adapter-level failure (network/API error on a channel).
    #[error("Adapter error ({channel}): {message}")]
    Adapter {
        /// Channel the adapter is bound to.
        channel: String,
        /// Error message.
        message: String,
    },

    /// Operation not supported by the adapter.
    #[error("Unsupported adapter operation ({channel}): {operation}")]
    Unsupported {
        /// Channel the adapter is bound to.
        channel: String,
        /// The operation that was requested.
        operation: String,
    },

    /// Agent backend call failed.
    #[error("Backend error: {0}")]
    Backend(String),

    /// The shared event subscription could not be established.
    ///
    /// The only fatal error class: surfaced to the composition root so it
    /// can decide between restart and shutdown.
    #[error("Event subscription failed: {0}")]
    Subscription(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid message or payload.
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BridgeError {
    /// Create an adapter error.
    pub fn adapter(channel: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Adapter {
            channel: channel.into(),
            message: message.into(),
        }
    }

    /// Create an unsupported-operation error.
    pub fn unsupported(channel: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::Unsupported {
            channel: channel.into(),
            operation: operation.into(),
        }
    }

    /// Create a backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }

    /// Whether this error must abort the router loop.
    ///
    /// Everything except a failed event subscription is recoverable: the
    /// router logs it and moves on to the next event.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Subscription(_))
    }
}
