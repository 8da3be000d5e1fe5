//! Shared test helpers for storage tests.

#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use keymint_storage::{KeyStore, StoreError};
use keymint_types::{AccessKey, KeyRecord, RoleId, UserId};
use std::sync::Arc;

pub fn key(s: &str) -> AccessKey {
    AccessKey::parse(s).unwrap()
}

pub fn record(k: &str, role: u64) -> KeyRecord {
    KeyRecord::new(key(k), RoleId::new(role))
}

pub fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap()
}

/// Runs the core redemption scenario against any backend.
pub fn exercise_redemption(store: &dyn KeyStore) {
    store.insert(&record("ABC123XYZ789", 555)).unwrap();

    let role = store
        .redeem(&key("ABC123XYZ789"), UserId::new(42), now())
        .unwrap();
    assert_eq!(role, RoleId::new(555));

    let err = store
        .redeem(&key("ABC123XYZ789"), UserId::new(99), now())
        .unwrap_err();
    assert!(matches!(err, StoreError::AlreadyRedeemed));

    let err = store
        .redeem(&key("NOPE00000000"), UserId::new(1), now())
        .unwrap_err();
    assert!(matches!(err, StoreError::KeyNotFound));
}

/// Hammers one key with concurrent redemptions; exactly one thread may
/// win, every other observes AlreadyRedeemed.
pub fn exercise_concurrent_redemption(store: Arc<dyn KeyStore>) {
    store.insert(&record("RACE00000000", 7)).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                store.redeem(&key("RACE00000000"), UserId::new(i), now())
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let winners = results.iter().filter(|r| r.is_ok()).count();
    let losers = results
        .iter()
        .filter(|r| matches!(r, Err(StoreError::AlreadyRedeemed)))
        .count();

    assert_eq!(winners, 1);
    assert_eq!(losers, 7);
}
