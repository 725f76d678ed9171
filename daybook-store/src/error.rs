//! Error types for the store boundary.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur talking to the store.
///
/// Everything here is a transport- or protocol-level failure. "Key absent"
/// is never an error: reads return empty maps, `None`, or empty lists.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Connection-level error (refused, reset, DNS).
    #[error("connection error: {0}")]
    Connection(String),

    /// The store rejected or failed a command.
    #[error("command failed: {0}")]
    Command(String),

    /// Malformed reply from the store.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The command did not complete within the configured timeout.
    #[error("operation timed out")]
    Timeout,
}
