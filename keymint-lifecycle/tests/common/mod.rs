//! Shared test helpers for lifecycle tests.

#![allow(dead_code)]

use keymint_license::{LicenseSigner, SigningSecret};
use keymint_lifecycle::KeyManager;
use keymint_storage::{KeyStore, MemoryStore};
use std::sync::Arc;

pub const SECRET: &str = "test shared secret";

/// Installs a fmt subscriber so `RUST_LOG` works when debugging tests.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

pub fn signer() -> LicenseSigner {
    LicenseSigner::new(SigningSecret::new(SECRET))
}

/// Manager over a fresh in-memory store; also returns the store handle
/// so tests can seed records directly.
pub fn memory_manager() -> (KeyManager, Arc<dyn KeyStore>) {
    let store: Arc<dyn KeyStore> = Arc::new(MemoryStore::new());
    (KeyManager::new(Arc::clone(&store), signer()), store)
}
