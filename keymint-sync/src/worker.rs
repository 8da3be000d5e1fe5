//! The single-writer push worker and startup hydration.
//!
//! All remote pushes for a store funnel through one worker task, so at
//! most one replace is in flight at a time. The worker coalesces queued
//! notifications and re-reads the local authoritative state at push
//! time, never the state captured when the notification was sent, so
//! every push reflects all mutations applied before it started.

use crate::remote::RemoteDocument;
use crate::SyncResult;
use keymint_storage::KeyStore;
use keymint_types::{decode_document, encode_records, KeyRecord};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// How long shutdown waits for the worker to drain.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the push worker.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Upper bound for a single push; on timeout the push is abandoned
    /// and the next mutation retries.
    pub push_timeout: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            push_timeout: Duration::from_secs(10),
        }
    }
}

/// Handle to the push worker. Cheap to share; mutation paths call
/// [`SyncHandle::notify`] after committing locally.
pub struct SyncHandle {
    tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl SyncHandle {
    /// Spawns the worker for the given store/remote pair.
    pub fn spawn(
        store: Arc<dyn KeyStore>,
        remote: Arc<dyn RemoteDocument>,
        config: SyncConfig,
    ) -> Self {
        // Capacity 1: a pending signal already guarantees the next push
        // will see our mutation, so further signals can be dropped.
        let (tx, mut rx) = mpsc::channel::<()>(1);

        let task = tokio::spawn(async move {
            while rx.recv().await.is_some() {
                while rx.try_recv().is_ok() {}
                push_latest(store.as_ref(), remote.as_ref(), config.push_timeout).await;
            }
            debug!(remote = %remote.describe(), "push worker stopped");
        });

        Self { tx, task }
    }

    /// Signals that the local store changed. Never blocks; the push
    /// happens on the worker, fire-and-forget.
    pub fn notify(&self) {
        match self.tx.try_send(()) {
            Ok(()) => {}
            Err(TrySendError::Full(())) => {
                // A push is already pending and will pick this change up.
            }
            Err(TrySendError::Closed(())) => {
                warn!("push worker is gone; remote mirror will not be updated");
            }
        }
    }

    /// Closes the queue, lets the worker drain pending pushes, and
    /// waits for it to finish (bounded).
    pub async fn shutdown(self) {
        drop(self.tx);
        if tokio::time::timeout(SHUTDOWN_TIMEOUT, self.task)
            .await
            .is_err()
        {
            warn!("push worker did not drain before shutdown timeout");
        }
    }
}

/// Serializes the current record set and replaces the remote document.
/// Failures are warnings: the triggering operation has already
/// committed locally and is never rolled back.
async fn push_latest(store: &dyn KeyStore, remote: &dyn RemoteDocument, timeout: Duration) {
    let records = match store.list_all() {
        Ok(records) => records,
        Err(e) => {
            warn!(%e, "skipping remote push: could not snapshot local store");
            return;
        }
    };

    let document = encode_records(&records);
    match tokio::time::timeout(timeout, remote.replace(&document)).await {
        Ok(Ok(())) => {
            debug!(records = records.len(), remote = %remote.describe(), "pushed record set");
        }
        Ok(Err(e)) => {
            warn!(%e, remote = %remote.describe(), "remote push failed; local store remains authoritative");
        }
        Err(_) => {
            warn!(remote = %remote.describe(), "remote push timed out; will retry on next mutation");
        }
    }
}

/// Fetches and parses the remote document into key records.
///
/// Used at startup by remote-primary deployments, before any operation
/// is served. Malformed lines are skipped with a warning and a summary
/// count; a damaged line never fails the whole load.
///
/// # Errors
///
/// Fails only if the document itself cannot be fetched.
pub async fn load_records(remote: &dyn RemoteDocument) -> SyncResult<Vec<KeyRecord>> {
    let Some(document) = remote.fetch().await? else {
        info!(remote = %remote.describe(), "remote document absent; starting with an empty record set");
        return Ok(Vec::new());
    };

    let (records, skipped) = decode_document(&document);
    for (line, err) in &skipped {
        warn!(line, %err, "skipping malformed remote line");
    }
    if !skipped.is_empty() {
        warn!(
            skipped = skipped.len(),
            remote = %remote.describe(),
            "remote document contained malformed lines"
        );
    }
    info!(records = records.len(), remote = %remote.describe(), "loaded remote document");
    Ok(records)
}
