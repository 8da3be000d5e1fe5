//! Core type definitions for Keymint.
//!
//! This crate defines the fundamental types shared by every other crate
//! in the workspace:
//! - `AccessKey`: the single-use token handed to a requester
//! - `RoleId` / `UserId`: platform identifiers (snowflake-style u64s)
//! - `KeyRecord`: the authoritative record of one issuance
//! - the line codec used by the journal file and the remote document
//!
//! Storage backends, sync, and signing all live in their own crates;
//! nothing here performs I/O.

mod ids;
mod key;
mod record;

pub use ids::{RoleId, UserId};
pub use key::AccessKey;
pub use record::{decode_document, encode_records, KeyRecord};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid access key: {0}")]
    InvalidKey(String),

    #[error("invalid record line: {0}")]
    InvalidRecord(String),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
