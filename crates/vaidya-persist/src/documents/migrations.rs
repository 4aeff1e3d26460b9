//! Additive schema gates for the document store.

use crate::documents::{Collection, DocumentStore};
use crate::error::{PersistError, Result};

pub const DATABASE_NAME: &str = "AyurvedaDB";

/// Latest schema version.
pub const SCHEMA_VERSION: u32 = 2;

/// `(version, collections created by that version)`, ascending.
const GATES: &[(u32, &[Collection])] = &[
    (1, &[Collection::Chats, Collection::Appointments]),
    (2, &[Collection::Feedback]),
];

/// Brings `store` up to `target`, running each gate with
/// `stored < gate <= target` once. Returns the version in effect.
pub async fn upgrade(store: &dyn DocumentStore, target: u32) -> Result<u32> {
    let stored = store.stored_version().await?;
    if target < stored {
        return Err(PersistError::VersionConflict {
            requested: target,
            stored,
        });
    }
    if target == stored {
        return Ok(stored);
    }

    for (version, collections) in GATES.iter().filter(|(v, _)| *v > stored && *v <= target) {
        for collection in collections.iter() {
            store.create_collection(*collection).await?;
        }
        store.set_version(*version).await?;
        tracing::info!(version, "document store schema upgraded");
    }

    // Versions beyond the last gate add nothing but still move the watermark.
    store.set_version(target).await?;
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::MemoryDocumentStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_version_one_has_no_feedback() {
        let store = MemoryDocumentStore::new();
        assert_eq!(upgrade(&store, 1).await.unwrap(), 1);

        store.put(Collection::Chats, json!({"id": "x"})).await.unwrap();
        let err = store.put(Collection::Feedback, json!({"id": 1})).await.unwrap_err();
        assert!(matches!(err, PersistError::CollectionMissing(_)));
    }

    #[tokio::test]
    async fn test_upgrade_keeps_existing_records() {
        let store = MemoryDocumentStore::new();
        upgrade(&store, 1).await.unwrap();
        store.put(Collection::Chats, json!({"id": "x"})).await.unwrap();

        upgrade(&store, SCHEMA_VERSION).await.unwrap();

        assert_eq!(store.get_all(Collection::Chats).await.unwrap().len(), 1);
        assert!(store.get_all(Collection::Feedback).await.unwrap().is_empty());
        assert_eq!(store.stored_version().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_downgrade_is_rejected() {
        let store = MemoryDocumentStore::new();
        upgrade(&store, 2).await.unwrap();
        let err = upgrade(&store, 1).await.unwrap_err();
        assert!(matches!(err, PersistError::VersionConflict { requested: 1, stored: 2 }));
    }
}
