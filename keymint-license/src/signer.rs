//! HMAC-SHA256 signing and constant-time verification.

use crate::{ArtifactMeta, LicenseArtifact, LicensePayload, LicenseResult};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use keymint_types::{AccessKey, UserId};
use sha2::Sha256;
use std::fmt;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// The shared signing secret.
///
/// Injected at process start and held only in memory; the `Debug`
/// impl is redacted so the secret cannot leak through logging.
pub struct SigningSecret(Vec<u8>);

impl SigningSecret {
    /// Wraps raw secret bytes.
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSecret(<redacted>)")
    }
}

/// Issues and verifies license artifacts.
///
/// The signed field set is fixed at construction: [`LicenseSigner::new`]
/// signs `{key, issued_to, issued_at}`, [`LicenseSigner::key_only`]
/// signs `{key}` alone (issuance time then travels as unsigned
/// metadata). Issuer and verifier must be configured identically.
#[derive(Debug)]
pub struct LicenseSigner {
    secret: SigningSecret,
    sign_issued_to: bool,
    sign_issued_at: bool,
}

impl LicenseSigner {
    /// Creates a signer covering the full field set.
    #[must_use]
    pub fn new(secret: SigningSecret) -> Self {
        Self {
            secret,
            sign_issued_to: true,
            sign_issued_at: true,
        }
    }

    /// Creates a signer covering only the key.
    #[must_use]
    pub fn key_only(secret: SigningSecret) -> Self {
        Self {
            secret,
            sign_issued_to: false,
            sign_issued_at: false,
        }
    }

    /// Builds and signs a license for a freshly issued key.
    pub fn issue(
        &self,
        key: &AccessKey,
        requester: UserId,
        now: DateTime<Utc>,
    ) -> LicenseResult<LicenseArtifact> {
        let payload = LicensePayload {
            key: key.clone(),
            issued_to: self.sign_issued_to.then_some(requester),
            issued_at: self.sign_issued_at.then_some(now.timestamp()),
        };
        let signature = self.sign(&payload)?;
        let meta = ArtifactMeta {
            issued_at: (!self.sign_issued_at).then_some(now.timestamp()),
        };
        Ok(LicenseArtifact {
            payload,
            signature,
            meta,
        })
    }

    /// Computes the hex HMAC-SHA256 tag over a payload's canonical bytes.
    pub fn sign(&self, payload: &LicensePayload) -> LicenseResult<String> {
        let bytes = payload.canonical_bytes()?;
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(&bytes);
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Verifies a payload/signature pair in constant time.
    ///
    /// Malformed hex verifies false; this never errors.
    #[must_use]
    pub fn verify(&self, payload: &LicensePayload, signature_hex: &str) -> bool {
        let Ok(claimed) = hex::decode(signature_hex) else {
            return false;
        };
        let Ok(bytes) = payload.canonical_bytes() else {
            return false;
        };
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(&bytes);
        let tag = mac.finalize().into_bytes();
        tag.as_slice().ct_eq(&claimed).into()
    }

    /// Verifies a whole artifact.
    #[must_use]
    pub fn verify_artifact(&self, artifact: &LicenseArtifact) -> bool {
        self.verify(&artifact.payload, &artifact.signature)
    }
}
