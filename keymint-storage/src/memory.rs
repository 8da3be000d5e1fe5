//! In-memory key store.
//!
//! Used by tests and by remote-primary deployments, where the record
//! set is hydrated from the remote document at startup and the remote
//! push worker provides the only durability.

use crate::{KeyStore, StoreError, StoreResult};
use chrono::{DateTime, Utc};
use keymint_types::{AccessKey, KeyRecord, RoleId, UserId};
use std::collections::HashMap;
use std::sync::RwLock;

/// Key store backed by a guarded hash map.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<AccessKey, KeyRecord>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-filled with existing records, replayed in
    /// order (the latest record for a key wins).
    #[must_use]
    pub fn from_records(records: Vec<KeyRecord>) -> Self {
        let map = records
            .into_iter()
            .map(|r| (r.key.clone(), r))
            .collect();
        Self {
            records: RwLock::new(map),
        }
    }
}

impl KeyStore for MemoryStore {
    fn insert(&self, record: &KeyRecord) -> StoreResult<()> {
        let mut records = self.records.write().unwrap();
        if records.contains_key(&record.key) {
            return Err(StoreError::DuplicateKey);
        }
        records.insert(record.key.clone(), record.clone());
        Ok(())
    }

    fn redeem(
        &self,
        key: &AccessKey,
        redeemer: UserId,
        now: DateTime<Utc>,
    ) -> StoreResult<RoleId> {
        let mut records = self.records.write().unwrap();
        let record = records.get_mut(key).ok_or(StoreError::KeyNotFound)?;
        if record.is_redeemed() {
            return Err(StoreError::AlreadyRedeemed);
        }
        record.mark_redeemed(redeemer, now);
        Ok(record.role)
    }

    fn list_all(&self) -> StoreResult<Vec<KeyRecord>> {
        let records = self.records.read().unwrap();
        let mut all: Vec<KeyRecord> = records.values().cloned().collect();
        all.sort_by(|a, b| a.key.as_str().cmp(b.key.as_str()));
        Ok(all)
    }

    fn unredeemed_count(&self) -> StoreResult<usize> {
        let records = self.records.read().unwrap();
        Ok(records.values().filter(|r| !r.is_redeemed()).count())
    }
}
