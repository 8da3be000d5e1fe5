//! Remote document mirroring for Keymint.
//!
//! The remote store is a single named text document supporting only
//! whole-document fetch and replace: no row locking, no transactions,
//! last writer wins. Reading-and-overwriting from each caller would
//! silently drop concurrent mutations, so all remote visibility goes
//! through one in-process [`SyncHandle`]: mutations notify the handle,
//! and a single worker task serializes pushes, re-reading the latest
//! local authoritative state for each one.
//!
//! Pushes are fire-and-forget relative to the triggering operation. A
//! failed or timed-out push is a warning; the local store remains
//! authoritative and the next mutation retries.

mod error;
mod http;
mod remote;
mod worker;

pub use error::{SyncError, SyncResult};
pub use http::{HttpRemote, HttpRemoteConfig};
pub use remote::{FsRemote, RemoteDocument};
pub use worker::{load_records, SyncConfig, SyncHandle};
