//! Fallback document store: named collections keyed by each record's `id`.

mod database;
mod file;
mod memory;
mod migrations;

pub use database::Database;
pub use file::FileDocumentStore;
pub use memory::MemoryDocumentStore;
pub use migrations::{upgrade, DATABASE_NAME, SCHEMA_VERSION};

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

use crate::error::{PersistError, Result};
use crate::models::RecordKey;

/// Collections the schema knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Chats,
    Appointments,
    Feedback,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Collection::Chats, Collection::Appointments, Collection::Feedback];

    pub fn name(self) -> &'static str {
        match self {
            Collection::Chats => "chats",
            Collection::Appointments => "appointments",
            Collection::Feedback => "feedback",
        }
    }

    pub fn from_name(name: &str) -> Option<Collection> {
        Collection::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Asynchronous document storage.
///
/// Records are JSON objects; `put` is a wholesale overwrite keyed by the
/// record's `id` field. Operations on a collection that has not been created
/// fail with [`PersistError::CollectionMissing`].
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Schema watermark, `0` for a fresh store.
    async fn stored_version(&self) -> Result<u32>;

    async fn set_version(&self, version: u32) -> Result<()>;

    /// Creating an existing collection is a no-op.
    async fn create_collection(&self, collection: Collection) -> Result<()>;

    async fn put(&self, collection: Collection, record: Value) -> Result<()>;

    async fn get(&self, collection: Collection, key: &RecordKey) -> Result<Option<Value>>;

    /// Every record in the collection, in no particular order.
    async fn get_all(&self, collection: Collection) -> Result<Vec<Value>>;

    async fn delete(&self, collection: Collection, key: &RecordKey) -> Result<()>;

    async fn clear(&self, collection: Collection) -> Result<()>;
}

/// The primary key of `record`, read from its `id` field.
pub fn record_key(collection: Collection, record: &Value) -> Result<RecordKey> {
    record
        .get("id")
        .and_then(RecordKey::from_value)
        .ok_or_else(|| PersistError::MissingKey(collection.name().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_key_requires_id() {
        assert_eq!(
            record_key(Collection::Chats, &json!({"id": "current_chat_history"})).unwrap(),
            RecordKey::from("current_chat_history")
        );
        let err = record_key(Collection::Feedback, &json!({"chatId": 1})).unwrap_err();
        assert!(matches!(err, PersistError::MissingKey(name) if name == "feedback"));
    }

    #[test]
    fn test_collection_names() {
        for collection in Collection::ALL {
            assert_eq!(Collection::from_name(collection.name()), Some(collection));
        }
        assert_eq!(Collection::from_name("users"), None);
    }
}
