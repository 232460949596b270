//! Dispatch and transport error types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// The queue is at capacity; the job was not admitted.
    #[error("mail queue is full")]
    QueueFull,

    /// The queue is shutting down or has shut down.
    #[error("mail queue is closed")]
    Closed,

    #[error("mail queue capacity must be at least 1")]
    InvalidCapacity,

    #[error("mail worker failed: {0}")]
    Worker(String),
}

/// Failure reported by a [`crate::MailTransport`].
#[derive(Debug, Error)]
#[error("mail transport error: {0}")]
pub struct TransportError(pub String);
