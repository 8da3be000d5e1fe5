//! The user-facing error taxonomy.
//!
//! Every externally observable outcome maps to a distinct variant with
//! a distinct message; in particular an unknown key and an
//! already-redeemed key are never conflated.

use keymint_license::LicenseError;
use keymint_storage::StoreError;
use keymint_sync::SyncError;
use keymint_types::RoleId;
use thiserror::Error;

/// Result type for lifecycle operations.
pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// Errors surfaced by the lifecycle manager.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Input rejected before reaching the store: wrong length or
    /// symbols outside the key alphabet.
    #[error("key is not in a valid format")]
    InvalidKey,

    /// Storage outcome: duplicate key, unknown key, already redeemed,
    /// or the backend being unavailable.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Generation kept colliding with existing keys.
    #[error("could not generate an unused key after {0} attempts")]
    GenerationExhausted(usize),

    /// License signing failed.
    #[error("license error: {0}")]
    License(#[from] LicenseError),

    /// Remote hydration failed at startup.
    #[error("sync error: {0}")]
    Sync(#[from] SyncError),

    /// The platform role grant failed *after* the redemption was
    /// committed. Constructed by the presentation collaborator; the
    /// redemption is not reversed, an operator reconciles manually.
    #[error("key redeemed, but granting role {role} failed: {reason}")]
    RoleGrantFailed {
        /// The role that should have been granted.
        role: RoleId,
        /// Platform-reported reason.
        reason: String,
    },

    /// Invalid or missing process configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error (panel config persistence).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error (panel config persistence).
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
