//! End-to-end coordinator and journal scenarios over real file-backed local
//! stores (in a temp dir) and in-memory doubles for the cloud and analysis
//! services.

use async_trait::async_trait;
use mindflow_application::{JournalService, SyncCoordinator};
use mindflow_core::{
    AnalysisInput, AnalysisService, AuthPhase, CloudConfig, CredentialRepository, Emotion, Entry,
    EntryAnnotation, EntryRepository, MindflowError, RegisterOutcome, RemoteStore, Result,
    SessionMarkerRepository, sort_newest_first,
};
use mindflow_infrastructure::{
    FileSessionMarkerRepository, LocalCredentialRepository, LocalEntryRepository,
};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tempfile::TempDir;

#[derive(Default)]
struct MockRemoteStore {
    record: Mutex<Option<Vec<Entry>>>,
    tombstoned: AtomicBool,
    signed_in: AtomicBool,
    confirmation_required: AtomicBool,
    fail_writes: AtomicBool,
    upload_count: AtomicUsize,
}

impl MockRemoteStore {
    fn with_record(entries: Vec<Entry>) -> Self {
        let store = Self::default();
        *store.record.lock().unwrap() = Some(entries);
        store
    }
}

#[async_trait]
impl RemoteStore for MockRemoteStore {
    async fn sign_up(&self, _identity: &str, _password: &str) -> Result<RegisterOutcome> {
        if self.confirmation_required.load(Ordering::SeqCst) {
            return Ok(RegisterOutcome::ConfirmationRequired);
        }
        self.signed_in.store(true, Ordering::SeqCst);
        Ok(RegisterOutcome::SignedIn)
    }

    async fn sign_in(&self, _identity: &str, _password: &str) -> Result<()> {
        self.signed_in.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn sign_out(&self) -> Result<()> {
        self.signed_in.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn fetch_entries(&self) -> Result<Vec<Entry>> {
        if self.tombstoned.load(Ordering::SeqCst) {
            return Ok(Vec::new());
        }
        Ok(self.record.lock().unwrap().clone().unwrap_or_default())
    }

    async fn upsert_entries(&self, entries: &[Entry]) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(MindflowError::persistence("simulated cloud outage"));
        }
        self.upload_count.fetch_add(1, Ordering::SeqCst);
        *self.record.lock().unwrap() = Some(entries.to_vec());
        Ok(())
    }

    async fn write_tombstone(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(MindflowError::persistence("simulated cloud outage"));
        }
        self.tombstoned.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn has_session(&self) -> bool {
        self.signed_in.load(Ordering::SeqCst)
    }
}

struct MockAnalysis {
    fail: bool,
}

#[async_trait]
impl AnalysisService for MockAnalysis {
    async fn annotate(&self, input: AnalysisInput, _language: &str) -> Result<EntryAnnotation> {
        if self.fail {
            return Err(MindflowError::analysis("simulated gateway failure"));
        }
        let transcript = match input {
            AnalysisInput::Text { content } => content,
            AnalysisInput::Audio { .. } => "transcribed audio".to_string(),
        };
        Ok(EntryAnnotation {
            transcript,
            emotion: Emotion::Joy,
            category: "Life".to_string(),
            tags: vec!["mock".to_string()],
        })
    }

    async fn reflect(&self, _entry_text: &str, _language: &str) -> Result<String> {
        if self.fail {
            return Err(MindflowError::analysis("simulated gateway failure"));
        }
        Ok("a thoughtful reflection".to_string())
    }
}

/// Entry store whose writes always fail, for the optimistic-write property.
struct FailingEntryStore;

#[async_trait]
impl EntryRepository for FailingEntryStore {
    async fn load(&self, _username: &str) -> Result<Vec<Entry>> {
        Ok(Vec::new())
    }

    async fn save(&self, _username: &str, _entries: &[Entry]) -> Result<()> {
        Err(MindflowError::persistence("disk full"))
    }

    async fn remove(&self, _username: &str) -> Result<()> {
        Ok(())
    }
}

/// Credential table whose removal always fails, for the deactivation path.
struct StuckCredentials;

#[async_trait]
impl CredentialRepository for StuckCredentials {
    async fn register(&self, _username: &str, _password: &str) -> Result<()> {
        Ok(())
    }

    async fn authenticate(&self, username: &str, _password: &str) -> Result<String> {
        Ok(username.to_string())
    }

    async fn change_password(&self, _username: &str, _current: &str, _new: &str) -> Result<()> {
        Ok(())
    }

    async fn remove(&self, _username: &str) -> Result<()> {
        Err(MindflowError::persistence("credential table locked"))
    }

    async fn exists(&self, _username: &str) -> Result<bool> {
        Ok(true)
    }
}

fn local_coordinator(dir: &TempDir) -> Arc<SyncCoordinator> {
    Arc::new(SyncCoordinator::new(
        CloudConfig::local_only(),
        Arc::new(LocalCredentialRepository::new(dir.path().join("users.json"))),
        Arc::new(LocalEntryRepository::new(dir.path().join("entries"))),
        Arc::new(FileSessionMarkerRepository::new(
            dir.path().join("session.json"),
        )),
        None,
    ))
}

fn cloud_coordinator(dir: &TempDir, remote: Arc<MockRemoteStore>) -> Arc<SyncCoordinator> {
    Arc::new(SyncCoordinator::new(
        CloudConfig::default(),
        Arc::new(LocalCredentialRepository::new(dir.path().join("users.json"))),
        Arc::new(LocalEntryRepository::new(dir.path().join("entries"))),
        Arc::new(FileSessionMarkerRepository::new(
            dir.path().join("session.json"),
        )),
        Some(remote),
    ))
}

fn entry_at(id: &str, timestamp: i64) -> Entry {
    let mut entry = Entry::new(format!("entry {id}"), Emotion::Calm, vec![], None);
    entry.id = id.to_string();
    entry.timestamp = timestamp;
    entry
}

#[tokio::test]
async fn test_local_register_seeds_and_survives_logout_login() {
    let dir = TempDir::new().unwrap();
    let coordinator = local_coordinator(&dir);

    let outcome = coordinator.register("alice", "secret").await.unwrap();
    assert_eq!(outcome, RegisterOutcome::SignedIn);
    assert_eq!(coordinator.phase().await, AuthPhase::Authenticated);

    let seeded = coordinator.entries().await;
    assert_eq!(seeded.len(), 6);

    coordinator.logout().await.unwrap();
    assert_eq!(coordinator.phase().await, AuthPhase::Anonymous);
    assert!(coordinator.entries().await.is_empty());

    coordinator.login("alice", "secret").await.unwrap();
    let restored = coordinator.entries().await;
    assert_eq!(restored, seeded);
}

#[tokio::test]
async fn test_session_marker_restores_across_restart() {
    let dir = TempDir::new().unwrap();
    {
        let coordinator = local_coordinator(&dir);
        coordinator.register("alice", "secret").await.unwrap();
    }

    // A fresh coordinator over the same files plays the role of a restart.
    let coordinator = local_coordinator(&dir);
    assert_eq!(coordinator.phase().await, AuthPhase::Anonymous);
    coordinator.resolve_session().await.unwrap();
    assert_eq!(coordinator.phase().await, AuthPhase::Authenticated);
    assert_eq!(coordinator.current_user().await.as_deref(), Some("alice"));
    assert_eq!(coordinator.entries().await.len(), 6);
}

#[tokio::test]
async fn test_cloud_login_uploads_local_cache_when_remote_empty() {
    let dir = TempDir::new().unwrap();
    let remote = Arc::new(MockRemoteStore::default());

    // Cache three entries locally for the identity before sign-in.
    let local_store = LocalEntryRepository::new(dir.path().join("entries"));
    let mut cached = vec![entry_at("a", 300), entry_at("b", 200), entry_at("c", 100)];
    sort_newest_first(&mut cached);
    local_store.save("user@example.com", &cached).await.unwrap();

    let coordinator = cloud_coordinator(&dir, remote.clone());
    coordinator.login("user@example.com", "pw").await.unwrap();

    assert_eq!(coordinator.entries().await, cached);
    assert_eq!(remote.upload_count.load(Ordering::SeqCst), 1);
    assert_eq!(remote.fetch_entries().await.unwrap(), cached);
}

#[tokio::test]
async fn test_cloud_login_nonempty_remote_wins_over_cache() {
    let dir = TempDir::new().unwrap();
    let cloud_entries = vec![entry_at("cloud", 50)];
    let remote = Arc::new(MockRemoteStore::with_record(cloud_entries.clone()));

    let local_store = LocalEntryRepository::new(dir.path().join("entries"));
    local_store
        .save("user@example.com", &[entry_at("newer-local", 900)])
        .await
        .unwrap();

    let coordinator = cloud_coordinator(&dir, remote.clone());
    coordinator.login("user@example.com", "pw").await.unwrap();

    // Cloud wins verbatim even though the cache is newer, and no upload runs.
    assert_eq!(coordinator.entries().await, cloud_entries);
    assert_eq!(remote.upload_count.load(Ordering::SeqCst), 0);
    // The local cache is refreshed to the winner.
    assert_eq!(
        local_store.load("user@example.com").await.unwrap(),
        cloud_entries
    );
}

#[tokio::test]
async fn test_tombstoned_remote_reads_as_empty_collection() {
    let dir = TempDir::new().unwrap();
    let remote = Arc::new(MockRemoteStore::with_record(vec![entry_at("old", 1)]));
    remote.tombstoned.store(true, Ordering::SeqCst);

    let coordinator = cloud_coordinator(&dir, remote);
    coordinator.login("user@example.com", "pw").await.unwrap();

    assert_eq!(coordinator.phase().await, AuthPhase::Authenticated);
    assert!(coordinator.entries().await.is_empty());
}

#[tokio::test]
async fn test_cloud_register_may_await_confirmation() {
    let dir = TempDir::new().unwrap();
    let remote = Arc::new(MockRemoteStore::default());
    remote.confirmation_required.store(true, Ordering::SeqCst);

    let coordinator = cloud_coordinator(&dir, remote);
    let outcome = coordinator.register("user@example.com", "pw").await.unwrap();

    assert_eq!(outcome, RegisterOutcome::ConfirmationRequired);
    assert_eq!(coordinator.phase().await, AuthPhase::AwaitingConfirmation);
    assert!(coordinator.current_user().await.is_none());
}

#[tokio::test]
async fn test_batch_delete_persists() {
    let dir = TempDir::new().unwrap();
    let coordinator = local_coordinator(&dir);
    coordinator.register("alice", "secret").await.unwrap();

    let five: Vec<Entry> = (0..5).map(|i| entry_at(&format!("e{i}"), i * 100)).collect();
    coordinator.mutate(five).await.unwrap();

    let journal = JournalService::new(coordinator.clone(), Arc::new(MockAnalysis { fail: false }));
    journal
        .delete_entries(&["e1".to_string(), "e3".to_string()])
        .await
        .unwrap();

    let remaining = coordinator.entries().await;
    assert_eq!(remaining.len(), 3);
    assert!(remaining.iter().all(|e| e.id != "e1" && e.id != "e3"));

    // The persisted store agrees with memory.
    let store = LocalEntryRepository::new(dir.path().join("entries"));
    assert_eq!(store.load("alice").await.unwrap(), remaining);
}

#[tokio::test]
async fn test_optimistic_mutate_keeps_memory_on_store_failure() {
    let dir = TempDir::new().unwrap();
    let credentials = Arc::new(LocalCredentialRepository::new(dir.path().join("users.json")));
    credentials.register("alice", "secret").await.unwrap();

    let coordinator = Arc::new(SyncCoordinator::new(
        CloudConfig::local_only(),
        credentials,
        Arc::new(FailingEntryStore),
        Arc::new(FileSessionMarkerRepository::new(
            dir.path().join("session.json"),
        )),
        None,
    ));
    coordinator.login("alice", "secret").await.unwrap();

    let new_collection = vec![entry_at("kept", 1)];
    let err = coordinator.mutate(new_collection.clone()).await.unwrap_err();
    assert!(err.is_persistence());
    // No rollback: the new collection is still active.
    assert_eq!(coordinator.entries().await, new_collection);
}

#[tokio::test]
async fn test_capture_falls_back_on_analysis_failure() {
    let dir = TempDir::new().unwrap();
    let coordinator = local_coordinator(&dir);
    coordinator.register("alice", "secret").await.unwrap();
    coordinator.mutate(Vec::new()).await.unwrap();

    let journal = JournalService::new(coordinator.clone(), Arc::new(MockAnalysis { fail: true }));
    let entry = journal
        .capture_text("a thought worth keeping".to_string(), "en")
        .await
        .unwrap();

    assert_eq!(entry.text, "a thought worth keeping");
    assert_eq!(entry.emotion, Emotion::Neutral);
    assert_eq!(entry.category.as_deref(), Some("Uncategorized"));
    assert_eq!(entry.tags, vec!["Unprocessed".to_string()]);
    assert_eq!(coordinator.entries().await.len(), 1);
}

#[tokio::test]
async fn test_voice_capture_keeps_audio_payload() {
    let dir = TempDir::new().unwrap();
    let coordinator = local_coordinator(&dir);
    coordinator.register("alice", "secret").await.unwrap();
    coordinator.mutate(Vec::new()).await.unwrap();

    let journal = JournalService::new(coordinator.clone(), Arc::new(MockAnalysis { fail: false }));
    let entry = journal
        .capture_voice("UklGRg==".to_string(), "audio/wav".to_string(), "en")
        .await
        .unwrap();

    assert_eq!(entry.text, "transcribed audio");
    assert_eq!(entry.audio_base64.as_deref(), Some("UklGRg=="));
    assert_eq!(coordinator.entries().await[0].id, entry.id);
}

#[tokio::test]
async fn test_reflection_is_generated_at_most_once() {
    let dir = TempDir::new().unwrap();
    let coordinator = local_coordinator(&dir);
    coordinator.register("alice", "secret").await.unwrap();
    coordinator.mutate(vec![entry_at("e", 1)]).await.unwrap();

    let journal = JournalService::new(coordinator.clone(), Arc::new(MockAnalysis { fail: false }));
    let first = journal.generate_reflection("e", "en").await.unwrap();
    assert_eq!(first, "a thoughtful reflection");

    // A second call returns the stored text even if the gateway now fails.
    let journal = JournalService::new(coordinator.clone(), Arc::new(MockAnalysis { fail: true }));
    let second = journal.generate_reflection("e", "en").await.unwrap();
    assert_eq!(second, first);
}

#[tokio::test]
async fn test_local_deactivation_is_irreversible() {
    let dir = TempDir::new().unwrap();
    let coordinator = local_coordinator(&dir);
    coordinator.register("alice", "secret").await.unwrap();

    coordinator.deactivate_account().await.unwrap();
    assert_eq!(coordinator.phase().await, AuthPhase::Anonymous);

    let err = coordinator.login("alice", "secret").await.unwrap_err();
    assert!(err.is_auth());
    // The entry file is gone too.
    let store = LocalEntryRepository::new(dir.path().join("entries"));
    assert!(store.load("alice").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_deactivation_still_clears_session() {
    let dir = TempDir::new().unwrap();
    let coordinator = Arc::new(SyncCoordinator::new(
        CloudConfig::local_only(),
        Arc::new(StuckCredentials),
        Arc::new(LocalEntryRepository::new(dir.path().join("entries"))),
        Arc::new(FileSessionMarkerRepository::new(
            dir.path().join("session.json"),
        )),
        None,
    ));
    coordinator.login("alice", "secret").await.unwrap();

    let err = coordinator.deactivate_account().await.unwrap_err();
    assert!(err.is_persistence());
    // The failure is reported, but the session is gone regardless.
    assert_eq!(coordinator.phase().await, AuthPhase::Anonymous);
    assert!(coordinator.current_user().await.is_none());
    assert!(coordinator.entries().await.is_empty());

    let marker = FileSessionMarkerRepository::new(dir.path().join("session.json"));
    assert!(marker.current().await.unwrap().is_none());
}

#[tokio::test]
async fn test_cloud_login_survives_failed_upload() {
    let dir = TempDir::new().unwrap();
    let remote = Arc::new(MockRemoteStore::default());
    remote.fail_writes.store(true, Ordering::SeqCst);

    let local_store = LocalEntryRepository::new(dir.path().join("entries"));
    let mut cached = vec![entry_at("a", 300), entry_at("b", 200), entry_at("c", 100)];
    sort_newest_first(&mut cached);
    local_store.save("user@example.com", &cached).await.unwrap();

    let coordinator = cloud_coordinator(&dir, remote.clone());
    coordinator.login("user@example.com", "pw").await.unwrap();

    // The upload failure is a warning; the local collection stays active.
    assert_eq!(coordinator.phase().await, AuthPhase::Authenticated);
    assert_eq!(coordinator.entries().await, cached);
    assert_eq!(remote.upload_count.load(Ordering::SeqCst), 0);
    assert!(remote.fetch_entries().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_cloud_deactivation_writes_tombstone_and_clears_session() {
    let dir = TempDir::new().unwrap();
    let remote = Arc::new(MockRemoteStore::with_record(vec![entry_at("e", 1)]));

    let coordinator = cloud_coordinator(&dir, remote.clone());
    coordinator.login("user@example.com", "pw").await.unwrap();
    coordinator.deactivate_account().await.unwrap();

    assert!(remote.tombstoned.load(Ordering::SeqCst));
    assert!(!remote.has_session().await);
    assert_eq!(coordinator.phase().await, AuthPhase::Anonymous);
    assert!(coordinator.current_user().await.is_none());
}

#[tokio::test]
async fn test_change_password_is_local_mode_only() {
    let dir = TempDir::new().unwrap();
    let coordinator = local_coordinator(&dir);
    coordinator.register("alice", "old").await.unwrap();
    coordinator.change_password("old", "new").await.unwrap();
    coordinator.logout().await.unwrap();
    coordinator.login("alice", "new").await.unwrap();

    let remote = Arc::new(MockRemoteStore::default());
    let cloud = cloud_coordinator(&dir, remote);
    cloud.login("user@example.com", "pw").await.unwrap();
    let err = cloud.change_password("pw", "other").await.unwrap_err();
    assert!(err.is_auth());
}

#[tokio::test]
async fn test_search_over_active_collection() {
    let dir = TempDir::new().unwrap();
    let coordinator = local_coordinator(&dir);
    coordinator.register("alice", "secret").await.unwrap();

    let mut a = entry_at("a", 200);
    a.text = "Morning coffee in the park".to_string();
    a.tags = vec!["Nature".to_string()];
    let mut b = entry_at("b", 100);
    b.text = "Sprint planning dragged on".to_string();
    b.category = Some("Work".to_string());
    coordinator.mutate(vec![a, b]).await.unwrap();

    let journal = JournalService::new(coordinator.clone(), Arc::new(MockAnalysis { fail: false }));
    assert_eq!(journal.search("nature").await.len(), 1);
    assert_eq!(journal.search("work").await.len(), 1);
    assert_eq!(journal.search("").await.len(), 2);
    assert!(journal.search("holiday").await.is_empty());
}
