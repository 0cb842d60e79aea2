//! Error types for monitor construction and notification routing.

use thiserror::Error;

use crate::notify::SessionId;

/// Errors raised by the monitoring core.
///
/// Configuration problems are reported when a component is built, never
/// while readings are being applied.
#[derive(Debug, Error, PartialEq)]
pub enum MonitorError {
    /// Event log capacity must be at least one.
    #[error("invalid event log capacity: {0}")]
    InvalidCapacity(usize),

    /// A watcher was built without the message it must emit.
    #[error("missing message for {0}")]
    MissingMessage(&'static str),

    /// A threshold value is outside the range the reading can take.
    #[error("invalid threshold for {field}: {value}")]
    InvalidThreshold { field: &'static str, value: f64 },

    /// A notification was dispatched to a session that is not registered.
    #[error("no monitor session registered for {0}")]
    UnknownSession(SessionId),
}
