#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use vaidya_persist::primary::ChangeNotifier;
use vaidya_persist::{
    Collection, DocumentStore, KeyValueBackend, ManualClock, MemoryDocumentStore,
    MemoryKeyValueStore, PersistClient, PersistError, RecordKey, Result,
};

pub const START_MS: i64 = 1_760_000_000_000;

/// Key-value backend whose writes can be switched off.
#[derive(Debug, Default)]
pub struct FlakyKeyValueStore {
    inner: MemoryKeyValueStore,
    fail_writes: AtomicBool,
}

impl FlakyKeyValueStore {
    pub fn failing() -> Self {
        let store = Self::default();
        store.set_failing(true);
        store
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_writes.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PersistError::Unavailable("primary store disabled".to_string()));
        }
        Ok(())
    }
}

impl KeyValueBackend for FlakyKeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.inner.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.check()?;
        self.inner.set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.check()?;
        self.inner.remove_item(key)
    }

    fn keys(&self) -> Result<Vec<String>> {
        self.inner.keys()
    }

    fn notifier(&self) -> &ChangeNotifier {
        self.inner.notifier()
    }
}

/// Document store that can be taken offline, or made to refuse writes to
/// one collection.
#[derive(Debug, Default)]
pub struct FlakyDocumentStore {
    inner: MemoryDocumentStore,
    offline: AtomicBool,
    refused: Mutex<Option<Collection>>,
}

impl FlakyDocumentStore {
    pub fn offline() -> Self {
        let store = Self::default();
        store.set_offline(true);
        store
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn refuse_puts_to(&self, collection: Option<Collection>) {
        *self.refused.lock().unwrap() = collection;
    }

    fn check(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(PersistError::Unavailable("document store offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FlakyDocumentStore {
    async fn stored_version(&self) -> Result<u32> {
        self.check()?;
        self.inner.stored_version().await
    }

    async fn set_version(&self, version: u32) -> Result<()> {
        self.check()?;
        self.inner.set_version(version).await
    }

    async fn create_collection(&self, collection: Collection) -> Result<()> {
        self.check()?;
        self.inner.create_collection(collection).await
    }

    async fn put(&self, collection: Collection, record: Value) -> Result<()> {
        self.check()?;
        if *self.refused.lock().unwrap() == Some(collection) {
            return Err(PersistError::Unavailable(format!("{} is read-only", collection.name())));
        }
        self.inner.put(collection, record).await
    }

    async fn get(&self, collection: Collection, key: &RecordKey) -> Result<Option<Value>> {
        self.check()?;
        self.inner.get(collection, key).await
    }

    async fn get_all(&self, collection: Collection) -> Result<Vec<Value>> {
        self.check()?;
        self.inner.get_all(collection).await
    }

    async fn delete(&self, collection: Collection, key: &RecordKey) -> Result<()> {
        self.check()?;
        self.inner.delete(collection, key).await
    }

    async fn clear(&self, collection: Collection) -> Result<()> {
        self.check()?;
        self.inner.clear(collection).await
    }
}

pub struct Harness {
    pub client: PersistClient,
    pub clock: Arc<ManualClock>,
    pub primary: Arc<FlakyKeyValueStore>,
    pub documents: Arc<FlakyDocumentStore>,
}

impl Harness {
    pub fn clock_now(&self) -> chrono::DateTime<chrono::Utc> {
        use vaidya_persist::Clock;
        self.clock.now()
    }
}

pub fn harness() -> Harness {
    let clock = Arc::new(ManualClock::new(START_MS));
    let primary = Arc::new(FlakyKeyValueStore::default());
    let documents = Arc::new(FlakyDocumentStore::default());
    let client = PersistClient::builder()
        .primary_backend(primary.clone())
        .document_store(documents.clone())
        .clock(clock.clone())
        .build()
        .unwrap();
    Harness {
        client,
        clock,
        primary,
        documents,
    }
}
