//! License artifact signing and verification for Keymint.
//!
//! A license artifact proves a key was legitimately issued by this
//! system, and is validated offline by an external verifier holding the
//! same shared secret. That split puts two hard requirements here:
//!
//! - **Canonical payload**: the signed field set is fixed per
//!   deployment and serialized deterministically (declaration order,
//!   compact JSON, absent optionals omitted). The verifier recomputes
//!   the tag over its own re-serialization, so any non-determinism
//!   breaks verification.
//! - **Clear signing boundary**: the artifact separates the signed
//!   payload from unsigned metadata; nothing outside the payload may
//!   ever be treated as trusted.
//!
//! Signatures are `HMAC-SHA256(secret, canonical_bytes)`, hex-encoded,
//! compared in constant time on verification.

mod artifact;
mod error;
mod signer;

pub use artifact::{ArtifactMeta, LicenseArtifact, LicensePayload};
pub use error::{LicenseError, LicenseResult};
pub use signer::{LicenseSigner, SigningSecret};
