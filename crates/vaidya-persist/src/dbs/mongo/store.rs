use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{self, doc, Bson, Document};
use mongodb::options::IndexOptions;
use mongodb::{Client, Database, IndexModel};
use serde_json::Value;

use crate::documents::{record_key, Collection, DocumentStore};
use crate::error::{PersistError, Result};
use crate::models::RecordKey;

const SCHEMA_COLLECTION: &str = "_schema";
const VERSION_DOC_ID: &str = "version";

/// MongoDB-backed document store.
///
/// Mongo creates collections on first write, so operations do not report
/// `CollectionMissing`; `create_collection` only ensures the unique `id` index.
#[derive(Clone)]
pub struct MongoDocumentStore {
    db: Database,
}

impl MongoDocumentStore {
    /// Connect to MongoDB and select `database`
    pub async fn connect(mongodb_uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(mongodb_uri)
            .await
            .map_err(|e| PersistError::Connection(e.to_string()))?;
        tracing::debug!(database, "connected to MongoDB");
        Ok(Self {
            db: client.database(database),
        })
    }

    fn collection(&self, collection: Collection) -> mongodb::Collection<Document> {
        self.db.collection(collection.name())
    }
}

fn key_filter(key: &RecordKey) -> Document {
    match key {
        RecordKey::Int(i) => doc! { "id": *i },
        RecordKey::Str(s) => doc! { "id": s.as_str() },
    }
}

fn into_json(mut document: Document) -> Result<Value> {
    document.remove("_id");
    Ok(bson::from_document(document)?)
}

#[async_trait]
impl DocumentStore for MongoDocumentStore {
    async fn stored_version(&self) -> Result<u32> {
        let meta = self
            .db
            .collection::<Document>(SCHEMA_COLLECTION)
            .find_one(doc! { "_id": VERSION_DOC_ID })
            .await?;
        let version = match meta.as_ref().and_then(|d| d.get("version")) {
            Some(Bson::Int32(v)) => i64::from(*v),
            Some(Bson::Int64(v)) => *v,
            _ => 0,
        };
        u32::try_from(version).map_err(|_| PersistError::Internal(format!("bad schema version {}", version)))
    }

    async fn set_version(&self, version: u32) -> Result<()> {
        self.db
            .collection::<Document>(SCHEMA_COLLECTION)
            .replace_one(
                doc! { "_id": VERSION_DOC_ID },
                doc! { "_id": VERSION_DOC_ID, "version": i64::from(version) },
            )
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn create_collection(&self, collection: Collection) -> Result<()> {
        let index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection(collection).create_index(index).await?;
        Ok(())
    }

    async fn put(&self, collection: Collection, record: Value) -> Result<()> {
        let key = record_key(collection, &record)?;
        let document = bson::to_document(&record)?;
        self.collection(collection)
            .replace_one(key_filter(&key), document)
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn get(&self, collection: Collection, key: &RecordKey) -> Result<Option<Value>> {
        self.collection(collection)
            .find_one(key_filter(key))
            .await?
            .map(into_json)
            .transpose()
    }

    async fn get_all(&self, collection: Collection) -> Result<Vec<Value>> {
        let documents: Vec<Document> = self
            .collection(collection)
            .find(doc! {})
            .await?
            .try_collect()
            .await?;
        documents.into_iter().map(into_json).collect()
    }

    async fn delete(&self, collection: Collection, key: &RecordKey) -> Result<()> {
        self.collection(collection).delete_one(key_filter(key)).await?;
        Ok(())
    }

    async fn clear(&self, collection: Collection) -> Result<()> {
        self.collection(collection).delete_many(doc! {}).await?;
        Ok(())
    }
}
