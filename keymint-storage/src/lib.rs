//! Key record storage backends for Keymint.
//!
//! The [`KeyStore`] trait is the single source of truth for key record
//! state and the only path that mutates records. Three backends
//! implement it:
//!
//! - [`SqliteStore`]: transactional local store (the default)
//! - [`JournalStore`]: flat append-only line file
//! - [`MemoryStore`]: in-memory map; tests and remote-primary
//!   deployments that hydrate from the remote document at startup
//!
//! All backends give the same guarantees: `insert` rejects duplicates,
//! `redeem` is an atomic compare-and-set on the unredeemed state (one
//! winner under concurrency), and a failed operation leaves the store
//! observably unchanged.

mod error;
mod journal;
mod memory;
mod sqlite;

pub use error::{StoreError, StoreResult};
pub use journal::JournalStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use chrono::{DateTime, Utc};
use keymint_types::{AccessKey, KeyRecord, RoleId, UserId};

/// Authoritative store for key records.
///
/// Implementations are safe for concurrent callers without external
/// locking. `list_all` and `unredeemed_count` return reporting
/// snapshots; stale reads are expected there and must never be used as
/// the basis for a mutation.
pub trait KeyStore: Send + Sync {
    /// Persists a fresh record.
    ///
    /// # Errors
    ///
    /// [`StoreError::DuplicateKey`] if the key already exists. On any
    /// error the store is unchanged.
    fn insert(&self, record: &KeyRecord) -> StoreResult<()>;

    /// Atomically redeems a key, returning the granted role.
    ///
    /// Exactly one of N concurrent calls for the same key succeeds; the
    /// rest observe [`StoreError::AlreadyRedeemed`].
    ///
    /// # Errors
    ///
    /// [`StoreError::KeyNotFound`] for an unknown key,
    /// [`StoreError::AlreadyRedeemed`] for a spent one. The two are
    /// never conflated.
    fn redeem(&self, key: &AccessKey, redeemer: UserId, now: DateTime<Utc>)
        -> StoreResult<RoleId>;

    /// Returns a snapshot of every record, ordered by key.
    fn list_all(&self) -> StoreResult<Vec<KeyRecord>>;

    /// Returns the number of keys not yet redeemed.
    fn unredeemed_count(&self) -> StoreResult<usize>;
}
