//! The access key token type.
//!
//! An access key is an opaque, unguessable string drawn from a fixed
//! 36-symbol alphabet (`A–Z0–9`). Generated keys are always
//! [`AccessKey::GENERATED_LEN`] symbols long; parsing accepts the
//! slightly wider `MIN_LEN..=MAX_LEN` range so that records written by
//! older deployments keep loading.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single-use access key.
///
/// The inner string is guaranteed canonical: uppercase alphanumeric,
/// within the accepted length range. Construction goes through
/// [`AccessKey::parse`], which normalizes user input (trims whitespace,
/// uppercases) before validating.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccessKey(String);

impl AccessKey {
    /// The canonical key alphabet: uppercase letters and digits.
    pub const ALPHABET: &'static [u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

    /// Length of newly generated keys.
    pub const GENERATED_LEN: usize = 16;

    /// Minimum accepted key length.
    pub const MIN_LEN: usize = 12;

    /// Maximum accepted key length.
    pub const MAX_LEN: usize = 16;

    /// Parses user input into a canonical access key.
    ///
    /// Input is trimmed and uppercased first, so `" abc123xyz789 "`
    /// parses to `ABC123XYZ789`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] if the normalized input is outside
    /// the accepted length range or contains symbols outside the
    /// alphabet.
    pub fn parse(input: &str) -> crate::Result<Self> {
        let normalized = input.trim().to_uppercase();

        if normalized.len() < Self::MIN_LEN || normalized.len() > Self::MAX_LEN {
            return Err(Error::InvalidKey(format!(
                "expected {}..={} symbols, got {}",
                Self::MIN_LEN,
                Self::MAX_LEN,
                normalized.len()
            )));
        }

        if let Some(bad) = normalized
            .bytes()
            .find(|b| !Self::ALPHABET.contains(b))
        {
            return Err(Error::InvalidKey(format!(
                "symbol {:?} is outside the key alphabet",
                bad as char
            )));
        }

        Ok(Self(normalized))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AccessKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for AccessKey {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AccessKey> for String {
    fn from(key: AccessKey) -> Self {
        key.0
    }
}
