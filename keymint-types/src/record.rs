//! The key record and its line codec.
//!
//! A `KeyRecord` is the authoritative state of one issuance. Records are
//! serialized one-per-line as `key,role,redeemed_by,redeemed_at` with
//! empty fields for the unredeemed case and RFC 3339 timestamps. The
//! same encoding is used by the append-only journal file and the remote
//! document, so both sides share this codec.

use crate::{AccessKey, Error, RoleId, UserId};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// The authoritative record of one issued key.
///
/// `redeemed_by` and `redeemed_at` are set together, exactly once, by
/// [`KeyRecord::mark_redeemed`]; a record never transitions back to the
/// unredeemed state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRecord {
    /// The access key this record tracks.
    pub key: AccessKey,
    /// Role granted on redemption.
    pub role: RoleId,
    /// Principal that redeemed the key, if any.
    pub redeemed_by: Option<UserId>,
    /// When the key was redeemed; present iff `redeemed_by` is.
    pub redeemed_at: Option<DateTime<Utc>>,
}

impl KeyRecord {
    /// Creates a fresh, unredeemed record.
    #[must_use]
    pub fn new(key: AccessKey, role: RoleId) -> Self {
        Self {
            key,
            role,
            redeemed_by: None,
            redeemed_at: None,
        }
    }

    /// Returns true once the key has been redeemed.
    #[must_use]
    pub fn is_redeemed(&self) -> bool {
        self.redeemed_by.is_some()
    }

    /// Marks the record redeemed, setting both redemption fields.
    pub fn mark_redeemed(&mut self, by: UserId, at: DateTime<Utc>) {
        self.redeemed_by = Some(by);
        self.redeemed_at = Some(at);
    }

    /// Serializes the record to its single-line form.
    #[must_use]
    pub fn to_line(&self) -> String {
        format!(
            "{},{},{},{}",
            self.key,
            self.role,
            self.redeemed_by.map(|u| u.to_string()).unwrap_or_default(),
            self.redeemed_at
                .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
                .unwrap_or_default(),
        )
    }

    /// Parses a record from its single-line form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRecord`] on a wrong field count, a bad
    /// key or role, or redemption fields that are not set together;
    /// [`Error::InvalidTimestamp`] on an unparseable timestamp.
    pub fn parse_line(line: &str) -> crate::Result<Self> {
        let fields: Vec<&str> = line.trim_end_matches(['\r', '\n']).split(',').collect();
        if fields.len() != 4 {
            return Err(Error::InvalidRecord(format!(
                "expected 4 fields, got {}",
                fields.len()
            )));
        }

        let key = AccessKey::parse(fields[0])?;
        let role: RoleId = fields[1]
            .parse()
            .map_err(|e| Error::InvalidRecord(format!("bad role id: {e}")))?;

        let redeemed_by = match fields[2] {
            "" => None,
            raw => Some(
                raw.parse::<UserId>()
                    .map_err(|e| Error::InvalidRecord(format!("bad redeemer id: {e}")))?,
            ),
        };

        let redeemed_at = match fields[3] {
            "" => None,
            raw => Some(
                DateTime::parse_from_rfc3339(raw)
                    .map(|t| t.with_timezone(&Utc))
                    .map_err(|e| Error::InvalidTimestamp(e.to_string()))?,
            ),
        };

        if redeemed_by.is_some() != redeemed_at.is_some() {
            return Err(Error::InvalidRecord(
                "redeemed_by and redeemed_at must be set together".to_string(),
            ));
        }

        Ok(Self {
            key,
            role,
            redeemed_by,
            redeemed_at,
        })
    }
}

/// Serializes a record set to document form: one line per record plus a
/// trailing newline. An empty set produces an empty document.
#[must_use]
pub fn encode_records(records: &[KeyRecord]) -> String {
    let mut out = String::new();
    for record in records {
        out.push_str(&record.to_line());
        out.push('\n');
    }
    out
}

/// Parses a document into records, tolerating damage: malformed lines
/// are collected separately instead of failing the whole load. Blank
/// lines are ignored.
///
/// Returns the parsed records and the (1-based line number, error) pair
/// for every line that was skipped.
#[must_use]
pub fn decode_document(document: &str) -> (Vec<KeyRecord>, Vec<(usize, Error)>) {
    let mut records = Vec::new();
    let mut skipped = Vec::new();

    for (idx, line) in document.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match KeyRecord::parse_line(line) {
            Ok(record) => records.push(record),
            Err(err) => skipped.push((idx + 1, err)),
        }
    }

    (records, skipped)
}
