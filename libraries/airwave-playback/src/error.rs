//! Error types for the broadcast engine

use std::time::Duration;
use thiserror::Error;

/// Engine configuration errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    /// Tick interval outside the supported range
    #[error("Tick interval {0:?} is outside the supported range of 20ms to 500ms")]
    InvalidTick(Duration),

    /// Invalid engine configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Why a write to a listener failed
///
/// Either way the listener is dropped from the registry; the failure never
/// reaches other listeners.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ClientWriteFailure {
    /// The listener's queue is full (stalled or slow client)
    #[error("listener is lagging behind the live edge")]
    Lagging,

    /// The listener hung up
    #[error("listener disconnected")]
    Disconnected,
}

/// Result type for engine configuration
pub type Result<T> = std::result::Result<T, PlaybackError>;
