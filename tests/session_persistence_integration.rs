//! Integration tests for session persistence
//!
//! Exercises the sled-backed store across reopen cycles: versions, chat,
//! archive cap and recovery from a corrupt blob.

use audial::config::SessionConfig;
use audial::session::{
    GenerationMode, SessionPersistence, SessionStore, SledPersistence, STORAGE_KEY,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

fn open(path: &std::path::Path, config: &SessionConfig) -> SessionStore {
    let persistence = SledPersistence::open(path).expect("Failed to open session db");
    SessionStore::new(Box::new(persistence), config)
}

#[test]
fn test_state_survives_reopen() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("session.db");
    let config = SessionConfig::default();

    let session_id = {
        let store = open(&db_path, &config);
        let session = store.start_new_session(Some("setcpm(80)\n$: s(\"bd\")"));
        store.append_user_message("add hats");
        let version = store.apply_new_code("setcpm(80)\n$: s(\"bd hh\")", Some("hats"));
        assert!(version.is_some());
        store.append_assistant_message("Added hats", Some("setcpm(80)\n$: s(\"bd hh\")".into()));
        session.session_id
    };

    let store = open(&db_path, &config);
    let session = store.current_session().expect("session should be restored");
    assert_eq!(session.session_id, session_id);
    assert_eq!(session.current_code, "setcpm(80)\n$: s(\"bd hh\")");
    assert_eq!(session.versions.len(), 1);
    assert_eq!(session.versions[0].note.as_deref(), Some("hats"));
    assert_eq!(session.chat.len(), 2);
    // Mode is not restored across loads
    assert_eq!(store.mode(), GenerationMode::Edit);
}

#[test]
fn test_archive_cap_persists() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("session.db");
    let config = SessionConfig {
        max_previous_sessions: 2,
        ..SessionConfig::default()
    };

    {
        let store = open(&db_path, &config);
        for i in 0..4 {
            store.start_new_session(None);
            store.append_user_message(&format!("message {}", i));
        }
        store.start_new_session(None);
    }

    let store = open(&db_path, &config);
    let archived = store.previous_sessions();
    assert_eq!(archived.len(), 2);
    assert_eq!(archived[0].chat[0].content, "message 3");
    assert_eq!(archived[1].chat[0].content, "message 2");
}

#[test]
fn test_corrupt_blob_starts_fresh() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("session.db");

    {
        let db = sled::open(&db_path).expect("Failed to open sled");
        db.insert(STORAGE_KEY, "{ definitely not json").unwrap();
        db.flush().unwrap();
    }

    let store = open(&db_path, &SessionConfig::default());
    assert!(store.current_session().is_none());

    // The next mutation overwrites the corrupt blob
    store.ensure_session();
    drop(store);

    let persistence = SledPersistence::open(&db_path).unwrap();
    let state = persistence.load().unwrap().expect("state should be stored");
    assert!(state.current_session.is_some());
}

#[test]
fn test_listeners_see_persisted_state() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = open(&temp_dir.path().join("session.db"), &SessionConfig::default());

    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let id = store.subscribe(Box::new(move |state| {
        assert!(state.current_session.is_some());
        seen.fetch_add(1, Ordering::SeqCst);
    }));

    store.start_new_session(None);
    store.append_user_message("hello");
    assert!(!store.update_last_assistant_message("nothing to update", None));
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    assert!(store.unsubscribe(id));
    store.clear_chat();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
