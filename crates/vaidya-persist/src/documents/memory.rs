use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use crate::documents::{record_key, Collection, DocumentStore};
use crate::error::{PersistError, Result};
use crate::models::RecordKey;

/// Collections held in process. Records iterate in key order.
#[derive(Debug, Default)]
pub(crate) struct Collections {
    pub(crate) version: u32,
    pub(crate) records: HashMap<Collection, BTreeMap<RecordKey, Value>>,
}

impl Collections {
    pub(crate) fn create(&mut self, collection: Collection) {
        self.records.entry(collection).or_default();
    }

    pub(crate) fn existing(&self, collection: Collection) -> Result<&BTreeMap<RecordKey, Value>> {
        self.records
            .get(&collection)
            .ok_or_else(|| PersistError::CollectionMissing(collection.name().to_string()))
    }

    pub(crate) fn existing_mut(&mut self, collection: Collection) -> Result<&mut BTreeMap<RecordKey, Value>> {
        self.records
            .get_mut(&collection)
            .ok_or_else(|| PersistError::CollectionMissing(collection.name().to_string()))
    }

    pub(crate) fn put(&mut self, collection: Collection, record: Value) -> Result<()> {
        let key = record_key(collection, &record)?;
        self.existing_mut(collection)?.insert(key, record);
        Ok(())
    }
}

/// In-process document store.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    state: RwLock<Collections>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn stored_version(&self) -> Result<u32> {
        Ok(self.state.read().await.version)
    }

    async fn set_version(&self, version: u32) -> Result<()> {
        self.state.write().await.version = version;
        Ok(())
    }

    async fn create_collection(&self, collection: Collection) -> Result<()> {
        self.state.write().await.create(collection);
        Ok(())
    }

    async fn put(&self, collection: Collection, record: Value) -> Result<()> {
        self.state.write().await.put(collection, record)
    }

    async fn get(&self, collection: Collection, key: &RecordKey) -> Result<Option<Value>> {
        Ok(self.state.read().await.existing(collection)?.get(key).cloned())
    }

    async fn get_all(&self, collection: Collection) -> Result<Vec<Value>> {
        Ok(self.state.read().await.existing(collection)?.values().cloned().collect())
    }

    async fn delete(&self, collection: Collection, key: &RecordKey) -> Result<()> {
        self.state.write().await.existing_mut(collection)?.remove(key);
        Ok(())
    }

    async fn clear(&self, collection: Collection) -> Result<()> {
        self.state.write().await.existing_mut(collection)?.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_put_overwrites_whole_record() {
        let store = MemoryDocumentStore::new();
        store.create_collection(Collection::Appointments).await.unwrap();

        store
            .put(Collection::Appointments, json!({"id": 1, "status": "pending", "name": "A"}))
            .await
            .unwrap();
        store
            .put(Collection::Appointments, json!({"id": 1, "status": "confirmed"}))
            .await
            .unwrap();

        let record = store
            .get(Collection::Appointments, &RecordKey::Int(1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record, json!({"id": 1, "status": "confirmed"}));
    }

    #[tokio::test]
    async fn test_uncreated_collection_is_missing() {
        let store = MemoryDocumentStore::new();
        let err = store.get_all(Collection::Feedback).await.unwrap_err();
        assert!(matches!(err, PersistError::CollectionMissing(_)));
    }
}
