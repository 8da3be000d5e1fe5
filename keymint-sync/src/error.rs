//! Error types for the sync layer.

use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur in sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Fetching the remote document failed.
    #[error("remote fetch failed: {0}")]
    Fetch(String),

    /// Replacing the remote document failed.
    #[error("remote push failed: {0}")]
    Push(String),

    /// A push did not complete within its timeout.
    #[error("remote push timed out")]
    Timeout,

    /// Reading the local authoritative store failed.
    #[error("storage error: {0}")]
    Store(#[from] keymint_storage::StoreError),
}
