use chrono::Duration;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use vaidya_persist::{
    FileKeyValueStore, KeyValueBackend, ManualClock, MemoryKeyValueStore, PrimaryStore,
};

fn memory_store() -> (PrimaryStore, Arc<MemoryKeyValueStore>, Arc<ManualClock>) {
    let backend = Arc::new(MemoryKeyValueStore::new());
    let clock = Arc::new(ManualClock::new(1_760_000_000_000));
    let store = PrimaryStore::new(backend.clone(), clock.clone());
    (store, backend, clock)
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Prefs {
    theme: String,
    font_size: u8,
}

#[test]
fn test_save_then_load_round_trips_without_expiry() {
    let (store, backend, _) = memory_store();
    let value = json!({"list": [1, "two", {"three": 3.5}], "flag": true});

    assert!(store.save("k", &value, None));
    assert_eq!(store.load("k"), Some(value.clone()));
    // Stored bare, no envelope.
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(&backend.get_item("k").unwrap().unwrap()).unwrap(),
        value
    );
}

#[test]
fn test_typed_load() {
    let (store, _, _) = memory_store();
    let prefs = Prefs {
        theme: "dark".to_string(),
        font_size: 14,
    };
    assert!(store.save("prefs", &prefs, None));
    assert_eq!(store.load_as::<Prefs>("prefs"), Some(prefs));
    assert_eq!(store.load_as::<Vec<u8>>("prefs"), None);
}

#[test]
fn test_value_expires_after_deadline_and_key_is_removed() {
    let (store, backend, clock) = memory_store();

    assert!(store.save("k", &json!("v"), Some(1)));
    clock.advance(Duration::hours(23));
    assert_eq!(store.load("k"), Some(json!("v")));

    clock.advance(Duration::hours(2));
    assert_eq!(store.load("k"), None);
    assert_eq!(backend.get_item("k").unwrap(), None);
}

#[test]
fn test_zero_expiry_days_means_no_expiry() {
    let (store, _, clock) = memory_store();
    assert!(store.save("k", &json!(1), Some(0)));
    clock.advance(Duration::days(365));
    assert_eq!(store.load("k"), Some(json!(1)));
}

#[test]
fn test_quota_failure_returns_false_and_keeps_old_value() {
    let backend = Arc::new(MemoryKeyValueStore::with_quota(64));
    let store = PrimaryStore::new(backend, Arc::new(ManualClock::new(0)));

    assert!(store.save("k", &json!("small"), None));
    assert!(!store.save("k", &"x".repeat(100), None));
    assert_eq!(store.load("k"), Some(json!("small")));
}

#[test]
fn test_clear_is_idempotent() {
    let (store, _, _) = memory_store();
    store.save("k", &json!(1), None);
    store.clear("k");
    store.clear("k");
    assert_eq!(store.load("k"), None);
    assert!(!store.contains("k"));
}

#[tokio::test]
async fn test_other_handle_receives_change_and_removal() {
    let (tab_a, _, _) = memory_store();
    let tab_b = tab_a.reopen();
    let mut sub = tab_b.subscribe();

    tab_a.save("ayurveda_chat_history", &json!([]), None);
    tab_a.clear("ayurveda_chat_history");

    let written = sub.recv().await.unwrap();
    assert_eq!(written.key, "ayurveda_chat_history");
    assert_eq!(written.new_value.as_deref(), Some("[]"));
    assert_eq!(written.origin, tab_a.handle_id());

    let removed = sub.recv().await.unwrap();
    assert_eq!(removed.new_value, None);
}

#[test]
fn test_concurrent_writers_last_one_wins() {
    let (tab_a, _, _) = memory_store();
    let tab_b = tab_a.reopen();

    tab_a.save("k", &json!("a"), None);
    tab_b.save("k", &json!("b"), None);

    assert_eq!(tab_a.load("k"), Some(json!("b")));
}

#[test]
fn test_file_backend_survives_restart_and_honours_expiry() {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(0));
    {
        let backend = Arc::new(FileKeyValueStore::open(dir.path()).unwrap());
        let store = PrimaryStore::new(backend, clock.clone());
        assert!(store.save("short", &json!("gone soon"), Some(1)));
        assert!(store.save("long", &json!({"keep": true}), None));
    }

    clock.advance(Duration::days(2));
    let backend = Arc::new(FileKeyValueStore::open(dir.path()).unwrap());
    let store = PrimaryStore::new(backend, clock);

    assert_eq!(store.load("short"), None);
    assert_eq!(store.load("long"), Some(json!({"keep": true})));
    assert_eq!(store.keys().unwrap(), vec!["long".to_string()]);
}
