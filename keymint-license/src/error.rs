//! Error types for the licensing module.

use thiserror::Error;

/// Result type for license operations.
pub type LicenseResult<T> = Result<T, LicenseError>;

/// Licensing-specific errors.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// Payload or artifact JSON is malformed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
