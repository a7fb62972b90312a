//! Error types for the monitoring core
//!
//! The taxonomy mirrors how each failure is recovered: a [`FetchError`]
//! discards the whole cycle, a [`DeliveryError`] is scoped to one message,
//! and a [`PersistenceError`] on save is logged and retried on a later
//! cycle. None of them ever terminates the watcher.

/// Failure to obtain the current track list from the source.
///
/// The watcher treats every cause identically (skip the cycle, keep the
/// prior snapshot, retry on the next tick), so the cause travels as an
/// opaque message rather than structured variants.
#[derive(Debug, Clone, thiserror::Error)]
#[error("fetch failed: {message}")]
pub struct FetchError {
    message: String,
}

impl FetchError {
    /// Create a fetch error from any displayable cause
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Failure to deliver a single notification message.
///
/// A delivery failure never aborts the remaining sends of the same cycle
/// and never blocks snapshot persistence.
#[derive(Debug, Clone, thiserror::Error)]
#[error("delivery failed: {message}")]
pub struct DeliveryError {
    message: String,
}

impl DeliveryError {
    /// Create a delivery error from any displayable cause
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Failure to read or write the persisted snapshot
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error returned by an on-demand check cycle
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    /// The fetch failed; the prior snapshot is untouched
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The watcher has shut down (or shut down mid-fetch)
    #[error("watcher is stopped")]
    Stopped,
}
