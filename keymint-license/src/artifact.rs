//! The license artifact and its canonical payload.
//!
//! The payload is what gets signed. Its serialization is canonical by
//! construction: serde emits struct fields in declaration order, the
//! encoding is compact (no insignificant whitespace), and absent
//! optionals are omitted entirely. Equal payloads therefore always
//! produce identical bytes, on both the issuing and verifying side.

use crate::LicenseResult;
use keymint_types::{AccessKey, UserId};
use serde::{Deserialize, Serialize};

/// The signed portion of a license.
///
/// Field selection (`issued_to`/`issued_at` present or not) is decided
/// by the signer configuration and must match the verifier deployment;
/// it never changes over a deployment's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicensePayload {
    /// The access key this license covers.
    pub key: AccessKey,
    /// Principal the key was issued to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_to: Option<UserId>,
    /// Issuance time, seconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<i64>,
}

impl LicensePayload {
    /// Returns the exact bytes covered by the signature.
    pub fn canonical_bytes(&self) -> LicenseResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Unsigned artifact metadata. Nothing in here is integrity-protected
/// and the verifier must never trust it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactMeta {
    /// Issuance time when it is not part of the signed payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<i64>,
}

impl ArtifactMeta {
    fn is_empty(&self) -> bool {
        self.issued_at.is_none()
    }
}

/// A signed license: the file handed to the requester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseArtifact {
    /// The signed payload.
    pub payload: LicensePayload,
    /// Hex-encoded HMAC-SHA256 over the payload's canonical bytes.
    pub signature: String,
    /// Unsigned metadata.
    #[serde(default, skip_serializing_if = "ArtifactMeta::is_empty")]
    pub meta: ArtifactMeta,
}

impl LicenseArtifact {
    /// Serializes the artifact to its UTF-8 JSON file form.
    pub fn to_json(&self) -> LicenseResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses an artifact from its JSON file form. Parsing performs no
    /// signature check; call [`crate::LicenseSigner::verify_artifact`]
    /// for that.
    pub fn from_json(raw: &str) -> LicenseResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Returns the exact bytes the signature covers.
    pub fn signed_bytes(&self) -> LicenseResult<Vec<u8>> {
        self.payload.canonical_bytes()
    }
}
