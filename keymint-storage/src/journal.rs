//! Append-only journal file key store.
//!
//! Every mutation appends one line in the shared record codec; the file
//! is never rewritten. On open the journal is replayed in order and the
//! latest line for a key wins, so a redemption is simply the updated
//! record appended after the original. Malformed lines are skipped with
//! a warning rather than failing the load.

use crate::{KeyStore, StoreError, StoreResult};
use chrono::{DateTime, Utc};
use keymint_types::{decode_document, AccessKey, KeyRecord, RoleId, UserId};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use tracing::{info, warn};

struct Inner {
    file: File,
    records: HashMap<AccessKey, KeyRecord>,
}

/// Key store backed by a flat append-only line file.
pub struct JournalStore {
    inner: Mutex<Inner>,
}

impl JournalStore {
    /// Opens (or creates) a journal at the given path, replaying any
    /// existing lines into the in-memory index.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();

        let mut records = HashMap::new();
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let (parsed, skipped) = decode_document(&content);
            for (line, err) in &skipped {
                warn!(line, %err, "skipping malformed journal line");
            }
            if !skipped.is_empty() {
                warn!(
                    skipped = skipped.len(),
                    path = %path.display(),
                    "journal contained malformed lines"
                );
            }
            // Replay in order: the latest line for a key wins.
            for record in parsed {
                records.insert(record.key.clone(), record);
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        info!(records = records.len(), path = %path.display(), "opened key journal");

        Ok(Self {
            inner: Mutex::new(Inner { file, records }),
        })
    }

    /// Appends a record line and syncs it to disk. The in-memory index
    /// must only be updated after this returns Ok, so a failed append
    /// leaves the store unchanged.
    fn append(file: &mut File, record: &KeyRecord) -> StoreResult<()> {
        let mut line = record.to_line();
        line.push('\n');
        file.write_all(line.as_bytes())?;
        file.sync_data()?;
        Ok(())
    }
}

impl KeyStore for JournalStore {
    fn insert(&self, record: &KeyRecord) -> StoreResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.records.contains_key(&record.key) {
            return Err(StoreError::DuplicateKey);
        }
        Self::append(&mut inner.file, record)?;
        inner.records.insert(record.key.clone(), record.clone());
        Ok(())
    }

    fn redeem(
        &self,
        key: &AccessKey,
        redeemer: UserId,
        now: DateTime<Utc>,
    ) -> StoreResult<RoleId> {
        let mut inner = self.inner.lock().unwrap();

        let mut updated = match inner.records.get(key) {
            None => return Err(StoreError::KeyNotFound),
            Some(record) if record.is_redeemed() => return Err(StoreError::AlreadyRedeemed),
            Some(record) => record.clone(),
        };
        updated.mark_redeemed(redeemer, now);

        Self::append(&mut inner.file, &updated)?;
        let role = updated.role;
        inner.records.insert(key.clone(), updated);
        Ok(role)
    }

    fn list_all(&self) -> StoreResult<Vec<KeyRecord>> {
        let inner = self.inner.lock().unwrap();
        let mut records: Vec<KeyRecord> = inner.records.values().cloned().collect();
        records.sort_by(|a, b| a.key.as_str().cmp(b.key.as_str()));
        Ok(records)
    }

    fn unredeemed_count(&self) -> StoreResult<usize> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.records.values().filter(|r| !r.is_redeemed()).count())
    }
}
