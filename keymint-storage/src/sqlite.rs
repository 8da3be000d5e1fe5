//! SQLite-backed key store.
//!
//! The default local backend. A single table holds the whole record
//! set; redemption runs inside a transaction with an
//! `AND redeemed_by IS NULL` guard, so the double-redeem invariant
//! holds even if another connection touches the same database file.

use crate::{KeyStore, StoreError, StoreResult};
use chrono::{DateTime, SecondsFormat, Utc};
use keymint_types::{AccessKey, KeyRecord, RoleId, UserId};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Key store backed by SQLite.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens (or creates) a store at the given path.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        info!(path = %path.display(), "opened sqlite key store");
        Ok(store)
    }

    /// Opens an in-memory store (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS keys (
                key         TEXT PRIMARY KEY,
                role_id     INTEGER NOT NULL,
                redeemed_by INTEGER,
                redeemed_at TEXT
            );
            ",
        )?;
        Ok(())
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<(String, i64, Option<i64>, Option<String>)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn record_from_row(
    (key, role, redeemed_by, redeemed_at): (String, i64, Option<i64>, Option<String>),
) -> StoreResult<KeyRecord> {
    let redeemed_at = redeemed_at
        .map(|raw| {
            DateTime::parse_from_rfc3339(&raw)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| keymint_types::Error::InvalidTimestamp(e.to_string()))
        })
        .transpose()?;

    Ok(KeyRecord {
        key: AccessKey::parse(&key)?,
        role: RoleId::new(role as u64),
        redeemed_by: redeemed_by.map(|u| UserId::new(u as u64)),
        redeemed_at,
    })
}

impl KeyStore for SqliteStore {
    fn insert(&self, record: &KeyRecord) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        let result = conn.execute(
            "INSERT INTO keys (key, role_id, redeemed_by, redeemed_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                record.key.as_str(),
                record.role.as_u64() as i64,
                record.redeemed_by.map(|u| u.as_u64() as i64),
                record
                    .redeemed_at
                    .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ],
        );
        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::DuplicateKey)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn redeem(
        &self,
        key: &AccessKey,
        redeemer: UserId,
        now: DateTime<Utc>,
    ) -> StoreResult<RoleId> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let row: Option<(i64, Option<i64>)> = tx
            .query_row(
                "SELECT role_id, redeemed_by FROM keys WHERE key = ?1",
                params![key.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let (role, redeemed_by) = row.ok_or(StoreError::KeyNotFound)?;
        if redeemed_by.is_some() {
            return Err(StoreError::AlreadyRedeemed);
        }

        // The IS NULL guard keeps this a compare-and-set even against
        // writers outside this process.
        let updated = tx.execute(
            "UPDATE keys SET redeemed_by = ?1, redeemed_at = ?2
             WHERE key = ?3 AND redeemed_by IS NULL",
            params![
                redeemer.as_u64() as i64,
                now.to_rfc3339_opts(SecondsFormat::Secs, true),
                key.as_str(),
            ],
        )?;
        if updated != 1 {
            return Err(StoreError::AlreadyRedeemed);
        }

        tx.commit()?;
        Ok(RoleId::new(role as u64))
    }

    fn list_all(&self) -> StoreResult<Vec<KeyRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT key, role_id, redeemed_by, redeemed_at FROM keys ORDER BY key",
        )?;
        let rows = stmt.query_map([], row_to_record)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(record_from_row(row?)?);
        }
        Ok(records)
    }

    fn unredeemed_count(&self) -> StoreResult<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM keys WHERE redeemed_by IS NULL",
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
