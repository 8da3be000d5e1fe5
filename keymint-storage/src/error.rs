//! Error types for the storage layer.

use thiserror::Error;

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Insert collided with an existing key.
    #[error("duplicate key")]
    DuplicateKey,

    /// The key does not exist in the record set.
    #[error("unknown key")]
    KeyNotFound,

    /// The key exists but was already redeemed.
    #[error("key already redeemed")]
    AlreadyRedeemed,

    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error (file system).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored record failed to decode.
    #[error("record codec error: {0}")]
    Codec(#[from] keymint_types::Error),
}
