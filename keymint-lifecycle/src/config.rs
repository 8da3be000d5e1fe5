//! Process configuration and panel state.
//!
//! [`Settings`] is the read-only configuration surface the bootstrap
//! collaborator fills from the environment: who administers the system,
//! the signing secret, and which storage backend to run on.
//! [`PanelConfig`] is the presentation layer's persisted binding of a
//! redemption panel to a channel/message/role; the core only reads the
//! role id from it.

use crate::{LifecycleError, LifecycleResult};
use keymint_types::{RoleId, UserId};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Storage backend selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// Transactional local SQLite database.
    Sqlite {
        /// Database file path.
        path: PathBuf,
    },
    /// Flat append-only journal file.
    Journal {
        /// Journal file path.
        path: PathBuf,
    },
    /// Remote-primary: the remote document is the only persistence and
    /// is hydrated into memory at startup.
    Remote {
        /// Document URL.
        url: String,
        /// Optional bearer token.
        token: Option<String>,
    },
}

/// Read-only process configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Name of the platform role allowed to issue keys.
    pub admin_role_name: String,
    /// Owner account that bypasses the admin role check.
    pub owner_id: Option<UserId>,
    /// Shared HMAC secret for license artifacts.
    pub secret: String,
    /// Authoritative storage backend.
    pub backend: Backend,
    /// Optional remote mirror for local backends.
    pub mirror_url: Option<String>,
    /// Bearer token for the mirror.
    pub mirror_token: Option<String>,
}

impl Settings {
    /// Reads settings from `KEYMINT_*` environment variables.
    ///
    /// `KEYMINT_SECRET` is required. `KEYMINT_BACKEND` selects
    /// `sqlite` (default), `journal`, or `remote`; each backend reads
    /// its own path/URL variable.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Config`] on a missing secret, an
    /// unknown backend name, a malformed owner id, or a remote backend
    /// without a URL.
    pub fn from_env() -> LifecycleResult<Self> {
        let admin_role_name =
            env::var("KEYMINT_ADMIN_ROLE").unwrap_or_else(|_| "KeyManager".to_string());

        let owner_id = match env::var("KEYMINT_OWNER_ID") {
            Ok(raw) => Some(raw.parse::<UserId>().map_err(|e| {
                LifecycleError::Config(format!("KEYMINT_OWNER_ID is not a valid id: {e}"))
            })?),
            Err(_) => None,
        };

        let secret = env::var("KEYMINT_SECRET")
            .map_err(|_| LifecycleError::Config("KEYMINT_SECRET is not set".to_string()))?;

        let backend_name =
            env::var("KEYMINT_BACKEND").unwrap_or_else(|_| "sqlite".to_string());
        let backend = match backend_name.as_str() {
            "sqlite" => Backend::Sqlite {
                path: env::var("KEYMINT_DB_PATH")
                    .unwrap_or_else(|_| "keys.db".to_string())
                    .into(),
            },
            "journal" => Backend::Journal {
                path: env::var("KEYMINT_KEYS_PATH")
                    .unwrap_or_else(|_| "keys.txt".to_string())
                    .into(),
            },
            "remote" => Backend::Remote {
                url: env::var("KEYMINT_REMOTE_URL").map_err(|_| {
                    LifecycleError::Config(
                        "KEYMINT_REMOTE_URL is required for the remote backend".to_string(),
                    )
                })?,
                token: env::var("KEYMINT_REMOTE_TOKEN").ok(),
            },
            other => {
                return Err(LifecycleError::Config(format!(
                    "unknown backend {other:?} (expected sqlite, journal, or remote)"
                )))
            }
        };

        Ok(Self {
            admin_role_name,
            owner_id,
            secret,
            backend,
            mirror_url: env::var("KEYMINT_MIRROR_URL").ok(),
            mirror_token: env::var("KEYMINT_MIRROR_TOKEN").ok(),
        })
    }
}

/// Persisted binding of the redemption panel to a channel, message,
/// and role. Owned by the presentation layer; the core reads only
/// `role_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelConfig {
    /// Channel the panel message lives in.
    pub channel_id: u64,
    /// Role granted by keys issued from this panel.
    pub role_id: RoleId,
    /// Message id of the posted panel.
    pub panel_message_id: u64,
}

impl PanelConfig {
    /// Loads the panel config, or `None` if it was never saved.
    pub fn load(path: impl AsRef<Path>) -> LifecycleResult<Option<Self>> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&raw)?))
    }

    /// Saves the panel config.
    pub fn save(&self, path: impl AsRef<Path>) -> LifecycleResult<()> {
        let raw = serde_json::to_string(self)?;
        std::fs::write(path, raw)?;
        Ok(())
    }
}
