use async_trait::async_trait;
use keymint_storage::{KeyStore, MemoryStore};
use keymint_sync::{load_records, FsRemote, RemoteDocument, SyncConfig, SyncError, SyncHandle};
use keymint_types::{decode_document, AccessKey, KeyRecord, RoleId, UserId};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

fn record(k: &str, role: u64) -> KeyRecord {
    KeyRecord::new(AccessKey::parse(k).unwrap(), RoleId::new(role))
}

/// Remote that fails its first `fail_times` replaces, then succeeds.
struct FlakyRemote {
    fail_times: usize,
    attempts: AtomicUsize,
    content: Mutex<Option<String>>,
}

impl FlakyRemote {
    fn new(fail_times: usize) -> Self {
        Self {
            fail_times,
            attempts: AtomicUsize::new(0),
            content: Mutex::new(None),
        }
    }
}

#[async_trait]
impl RemoteDocument for FlakyRemote {
    fn describe(&self) -> String {
        "flaky://test".to_string()
    }

    async fn fetch(&self) -> Result<Option<String>, SyncError> {
        Ok(self.content.lock().await.clone())
    }

    async fn replace(&self, content: &str) -> Result<(), SyncError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.fail_times {
            return Err(SyncError::Push("simulated outage".to_string()));
        }
        *self.content.lock().await = Some(content.to_string());
        Ok(())
    }
}

/// Remote whose replace never completes.
struct HangingRemote;

#[async_trait]
impl RemoteDocument for HangingRemote {
    fn describe(&self) -> String {
        "hang://test".to_string()
    }

    async fn fetch(&self) -> Result<Option<String>, SyncError> {
        Ok(None)
    }

    async fn replace(&self, _content: &str) -> Result<(), SyncError> {
        std::future::pending::<()>().await;
        unreachable!()
    }
}

#[tokio::test]
async fn notify_pushes_the_latest_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("keys.txt");
    let store: Arc<dyn KeyStore> = Arc::new(MemoryStore::new());
    let remote: Arc<dyn RemoteDocument> = Arc::new(FsRemote::new(&path));

    let handle = SyncHandle::spawn(Arc::clone(&store), remote, SyncConfig::default());

    store.insert(&record("ABC123XYZ789", 555)).unwrap();
    handle.notify();
    handle.shutdown().await;

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content, "ABC123XYZ789,555,,\n");
}

#[tokio::test]
async fn concurrent_mutations_all_reach_the_remote() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("keys.txt");
    let store: Arc<dyn KeyStore> = Arc::new(MemoryStore::new());
    let remote: Arc<dyn RemoteDocument> = Arc::new(FsRemote::new(&path));

    let handle = Arc::new(SyncHandle::spawn(
        Arc::clone(&store),
        remote,
        SyncConfig::default(),
    ));

    let mut tasks = Vec::new();
    for i in 0..20u64 {
        let store = Arc::clone(&store);
        let handle = Arc::clone(&handle);
        tasks.push(tokio::spawn(async move {
            let key = format!("KEY{i:02}AAAAAAAAA");
            store.insert(&record(&key, i)).unwrap();
            handle.notify();
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    Arc::try_unwrap(handle).ok().unwrap().shutdown().await;

    // every mutation is visible: nothing was lost to overlapping pushes
    let content = std::fs::read_to_string(&path).unwrap();
    let (records, skipped) = decode_document(&content);
    assert!(skipped.is_empty());
    assert_eq!(records.len(), 20);
}

#[tokio::test]
async fn failed_push_is_retried_on_next_mutation() {
    let store: Arc<dyn KeyStore> = Arc::new(MemoryStore::new());
    let remote = Arc::new(FlakyRemote::new(1));

    let handle = SyncHandle::spawn(
        Arc::clone(&store),
        Arc::clone(&remote) as Arc<dyn RemoteDocument>,
        SyncConfig::default(),
    );

    // first push fails; the local insert has still succeeded
    store.insert(&record("ABC123XYZ789", 555)).unwrap();
    handle.notify();
    while remote.attempts.load(Ordering::SeqCst) == 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(store.unredeemed_count().unwrap(), 1);

    // next mutation's push carries both records
    store.insert(&record("DEF456UVW012", 777)).unwrap();
    handle.notify();
    handle.shutdown().await;

    let content = remote.fetch().await.unwrap().unwrap();
    let (records, _) = decode_document(&content);
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn hanging_remote_does_not_wedge_the_worker() {
    let store: Arc<dyn KeyStore> = Arc::new(MemoryStore::new());
    let handle = SyncHandle::spawn(
        Arc::clone(&store),
        Arc::new(HangingRemote),
        SyncConfig {
            push_timeout: Duration::from_millis(20),
        },
    );

    store.insert(&record("ABC123XYZ789", 555)).unwrap();
    handle.notify();

    // the push times out; shutdown must still complete promptly
    tokio::time::timeout(Duration::from_secs(5), handle.shutdown())
        .await
        .expect("shutdown should not hang");
}

#[tokio::test]
async fn redemption_reaches_the_remote() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("keys.txt");
    let store: Arc<dyn KeyStore> = Arc::new(MemoryStore::new());
    let remote: Arc<dyn RemoteDocument> = Arc::new(FsRemote::new(&path));
    let handle = SyncHandle::spawn(Arc::clone(&store), remote, SyncConfig::default());

    store.insert(&record("ABC123XYZ789", 555)).unwrap();
    handle.notify();
    store
        .redeem(
            &AccessKey::parse("ABC123XYZ789").unwrap(),
            UserId::new(42),
            chrono::Utc::now(),
        )
        .unwrap();
    handle.notify();
    handle.shutdown().await;

    let content = std::fs::read_to_string(&path).unwrap();
    let (records, _) = decode_document(&content);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].redeemed_by, Some(UserId::new(42)));
}

#[tokio::test]
async fn load_records_from_absent_remote_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let remote = FsRemote::new(dir.path().join("keys.txt"));
    assert!(load_records(&remote).await.unwrap().is_empty());
}

#[tokio::test]
async fn load_records_skips_malformed_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("keys.txt");
    std::fs::write(
        &path,
        "ABC123XYZ789,555,,\nnot,a,record\nDEF456UVW012,777,42,2026-03-14T09:26:53Z\n",
    )
    .unwrap();

    let remote = FsRemote::new(&path);
    let records = load_records(&remote).await.unwrap();
    assert_eq!(records.len(), 2);
    assert!(records[1].is_redeemed());
}
