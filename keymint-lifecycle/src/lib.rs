//! Key lifecycle orchestration for Keymint.
//!
//! [`KeyManager`] is the front door: it wires the generator, the
//! authoritative store, the optional remote push worker, and the
//! license signer behind two operations (issue a key, redeem a key)
//! plus reporting and shutdown. A key moves `Unissued →
//! Issued(Unredeemed) → Redeemed` and never backwards.
//!
//! The presentation layer (buttons, commands, permission checks, role
//! grants) lives outside this workspace; it calls in with plain role
//! and user identifiers and maps the error taxonomy in
//! [`LifecycleError`] to user-facing messages.

mod config;
mod error;
mod generator;
mod manager;

pub use config::{Backend, PanelConfig, Settings};
pub use error::{LifecycleError, LifecycleResult};
pub use generator::KeyGenerator;
pub use manager::{KeyManager, MAX_GENERATION_ATTEMPTS};
