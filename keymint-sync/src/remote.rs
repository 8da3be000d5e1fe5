//! The remote document abstraction.
//!
//! A remote document is the weakest store we target: a single named
//! text blob that can only be fetched or replaced wholesale. Providers
//! implement this trait; ordering and lost-update protection live in
//! the push worker, never here.

use crate::{SyncError, SyncResult};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tracing::debug;

/// A versionless whole-document remote store.
#[async_trait]
pub trait RemoteDocument: Send + Sync {
    /// A short human-readable identifier for log lines.
    fn describe(&self) -> String;

    /// Fetches the whole document, or `None` if it does not exist yet.
    async fn fetch(&self) -> SyncResult<Option<String>>;

    /// Replaces the whole document.
    async fn replace(&self, content: &str) -> SyncResult<()>;
}

/// Remote document stored as a plain file.
///
/// Covers simple deployments where the "remote" is a mounted share or
/// synced folder, and doubles as the test provider.
pub struct FsRemote {
    path: PathBuf,
}

impl FsRemote {
    /// Creates a provider for the given file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RemoteDocument for FsRemote {
    fn describe(&self) -> String {
        format!("file://{}", self.path.display())
    }

    async fn fetch(&self) -> SyncResult<Option<String>> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SyncError::Fetch(e.to_string())),
        }
    }

    async fn replace(&self, content: &str) -> SyncResult<()> {
        fs::write(&self.path, content)
            .await
            .map_err(|e| SyncError::Push(e.to_string()))?;
        debug!(path = %self.path.display(), bytes = content.len(), "replaced file remote");
        Ok(())
    }
}
