use serde_json::Value;
use std::sync::Arc;

use crate::documents::{migrations, Collection, DocumentStore};
use crate::error::Result;
use crate::models::RecordKey;

/// A document store opened at a fixed schema version.
///
/// Every operation re-runs the open check first, so a store that another
/// handle moved past this version reports `VersionConflict` instead of
/// being written with a stale layout.
#[derive(Clone)]
pub struct Database {
    store: Arc<dyn DocumentStore>,
    version: u32,
}

impl Database {
    pub async fn open(store: Arc<dyn DocumentStore>, version: u32) -> Result<Self> {
        migrations::upgrade(store.as_ref(), version).await?;
        Ok(Self { store, version })
    }

    /// Wraps a store without touching it; the first operation performs the open.
    pub fn lazy(store: Arc<dyn DocumentStore>, version: u32) -> Self {
        Self { store, version }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    async fn ready(&self) -> Result<&dyn DocumentStore> {
        migrations::upgrade(self.store.as_ref(), self.version).await?;
        Ok(self.store.as_ref())
    }

    pub async fn put(&self, collection: Collection, record: Value) -> Result<()> {
        let store = self.ready().await?;
        tracing::debug!(collection = %collection, "document store put");
        store.put(collection, record).await
    }

    pub async fn get(&self, collection: Collection, key: impl Into<RecordKey>) -> Result<Option<Value>> {
        let key = key.into();
        self.ready().await?.get(collection, &key).await
    }

    pub async fn get_all(&self, collection: Collection) -> Result<Vec<Value>> {
        self.ready().await?.get_all(collection).await
    }

    pub async fn delete(&self, collection: Collection, key: impl Into<RecordKey>) -> Result<()> {
        let key = key.into();
        let store = self.ready().await?;
        tracing::debug!(collection = %collection, key = %key, "document store delete");
        store.delete(collection, &key).await
    }

    pub async fn clear(&self, collection: Collection) -> Result<()> {
        let store = self.ready().await?;
        tracing::debug!(collection = %collection, "document store clear");
        store.clear(collection).await
    }
}
