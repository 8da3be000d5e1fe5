//! The lifecycle manager.

use crate::config::{Backend, Settings};
use crate::generator::KeyGenerator;
use crate::{LifecycleError, LifecycleResult};
use chrono::Utc;
use keymint_license::{LicenseArtifact, LicenseSigner, SigningSecret};
use keymint_storage::{JournalStore, KeyStore, MemoryStore, SqliteStore, StoreError};
use keymint_sync::{
    load_records, FsRemote, HttpRemote, HttpRemoteConfig, RemoteDocument, SyncConfig, SyncHandle,
};
use keymint_types::{encode_records, AccessKey, KeyRecord, RoleId, UserId};
use std::sync::Arc;
use tracing::{info, warn};

/// Generation retries before issuance gives up.
pub const MAX_GENERATION_ATTEMPTS: usize = 5;

/// Orchestrates the key/license lifecycle.
///
/// Shared behind an `Arc` by concurrent callers; every operation takes
/// `&self`. The store's atomicity carries the hard invariants, the
/// manager adds generation retry, remote notification, and signing.
pub struct KeyManager {
    store: Arc<dyn KeyStore>,
    signer: LicenseSigner,
    generator: KeyGenerator,
    sync: Option<SyncHandle>,
}

impl KeyManager {
    /// Creates a manager over an existing store, without a remote
    /// mirror.
    pub fn new(store: Arc<dyn KeyStore>, signer: LicenseSigner) -> Self {
        Self {
            store,
            signer,
            generator: KeyGenerator::new(),
            sync: None,
        }
    }

    /// Attaches a remote push worker; every committed mutation will
    /// notify it.
    #[must_use]
    pub fn with_sync(mut self, sync: SyncHandle) -> Self {
        self.sync = Some(sync);
        self
    }

    /// Replaces the key generator.
    #[must_use]
    pub fn with_generator(mut self, generator: KeyGenerator) -> Self {
        self.generator = generator;
        self
    }

    /// Builds a full manager from process settings: opens the selected
    /// backend (hydrating from the remote document for remote-primary
    /// deployments), attaches the mirror worker if configured, and
    /// constructs the signer.
    pub async fn from_settings(settings: &Settings) -> LifecycleResult<Self> {
        let signer = LicenseSigner::new(SigningSecret::new(settings.secret.as_str()));

        let (store, sync): (Arc<dyn KeyStore>, Option<SyncHandle>) = match &settings.backend {
            Backend::Sqlite { path } => (Arc::new(SqliteStore::open(path)?), None),
            Backend::Journal { path } => (Arc::new(JournalStore::open(path)?), None),
            Backend::Remote { url, token } => {
                let remote = remote_for(url, token.as_deref())?;
                let records = load_records(remote.as_ref()).await?;
                let store: Arc<dyn KeyStore> = Arc::new(MemoryStore::from_records(records));
                let sync =
                    SyncHandle::spawn(Arc::clone(&store), remote, SyncConfig::default());
                (store, Some(sync))
            }
        };

        let mut manager = Self {
            store,
            signer,
            generator: KeyGenerator::new(),
            sync,
        };

        // A local backend can still mirror to a remote document.
        if manager.sync.is_none() {
            if let Some(url) = &settings.mirror_url {
                let remote = remote_for(url, settings.mirror_token.as_deref())?;
                manager.sync = Some(SyncHandle::spawn(
                    Arc::clone(&manager.store),
                    remote,
                    SyncConfig::default(),
                ));
            }
        } else if settings.mirror_url.is_some() {
            warn!("ignoring mirror URL: the remote backend is already the system of record");
        }

        Ok(manager)
    }

    /// Issues a key for the given role and signs a license for the
    /// requester.
    ///
    /// Generation retries on collision up to [`MAX_GENERATION_ATTEMPTS`]
    /// times. Once the insert commits the key is validly issued; a
    /// downstream delivery failure does not un-issue it.
    pub fn issue_key(
        &self,
        role: RoleId,
        requester: UserId,
    ) -> LifecycleResult<LicenseArtifact> {
        let mut attempts = 0;
        let record = loop {
            attempts += 1;
            let record = KeyRecord::new(self.generator.generate(), role);
            match self.store.insert(&record) {
                Ok(()) => break record,
                Err(StoreError::DuplicateKey) if attempts < MAX_GENERATION_ATTEMPTS => {
                    warn!(attempts, "generated key collided, retrying");
                }
                Err(StoreError::DuplicateKey) => {
                    return Err(LifecycleError::GenerationExhausted(MAX_GENERATION_ATTEMPTS));
                }
                Err(e) => return Err(e.into()),
            }
        };

        self.notify_sync();
        let artifact = self.signer.issue(&record.key, requester, Utc::now())?;
        info!(%role, %requester, "issued key");
        Ok(artifact)
    }

    /// Redeems a key, returning the role to grant.
    ///
    /// The grant itself is the presentation collaborator's side effect;
    /// if it fails, the redemption stays committed and the collaborator
    /// reports [`LifecycleError::RoleGrantFailed`].
    pub fn redeem(&self, input: &str, requester: UserId) -> LifecycleResult<RoleId> {
        let key = AccessKey::parse(input).map_err(|_| LifecycleError::InvalidKey)?;
        let role = self.store.redeem(&key, requester, Utc::now())?;
        self.notify_sync();
        info!(%role, %requester, "redeemed key");
        Ok(role)
    }

    /// Returns a reporting snapshot of every record.
    pub fn list_keys(&self) -> LifecycleResult<Vec<KeyRecord>> {
        Ok(self.store.list_all()?)
    }

    /// Returns the number of keys not yet redeemed.
    pub fn unredeemed_count(&self) -> LifecycleResult<usize> {
        Ok(self.store.unredeemed_count()?)
    }

    /// Serializes the full record set to the line format: the
    /// downloadable keys file.
    pub fn export_keys(&self) -> LifecycleResult<String> {
        Ok(encode_records(&self.store.list_all()?))
    }

    /// Flushes pending remote pushes and stops the worker.
    pub async fn shutdown(self) {
        if let Some(sync) = self.sync {
            sync.shutdown().await;
        }
    }

    fn notify_sync(&self) {
        if let Some(sync) = &self.sync {
            sync.notify();
        }
    }
}

fn remote_for(url: &str, token: Option<&str>) -> LifecycleResult<Arc<dyn RemoteDocument>> {
    if let Some(path) = url.strip_prefix("file://") {
        return Ok(Arc::new(FsRemote::new(path)));
    }
    let mut config = HttpRemoteConfig::new(url);
    if let Some(token) = token {
        config = config.with_bearer_token(token);
    }
    Ok(Arc::new(HttpRemote::new(config)?))
}
