use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;

use crate::documents::memory::Collections;
use crate::documents::{Collection, DocumentStore};
use crate::error::Result;
use crate::models::RecordKey;

const SCHEMA_FILE: &str = "_schema.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct SchemaFile {
    version: u32,
    collections: Vec<String>,
}

/// Document store persisted as one JSON array per collection under a directory.
///
/// The whole store is loaded on open; each mutation rewrites the file of the
/// collection it touched.
#[derive(Debug)]
pub struct FileDocumentStore {
    dir: PathBuf,
    state: RwLock<Collections>,
}

impl FileDocumentStore {
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;

        let mut state = Collections::default();
        if let Some(text) = read_optional(&dir.join(SCHEMA_FILE)).await? {
            let schema: SchemaFile = serde_json::from_str(&text)?;
            state.version = schema.version;
            for collection in schema.collections.iter().filter_map(|name| Collection::from_name(name)) {
                state.create(collection);
                let path = collection_path(&dir, collection);
                if let Some(text) = read_optional(&path).await? {
                    let records: Vec<Value> = serde_json::from_str(&text)?;
                    for record in records {
                        state.put(collection, record)?;
                    }
                }
            }
        }

        tracing::debug!(
            dir = %dir.display(),
            version = state.version,
            collections = state.records.len(),
            "opened file document store"
        );
        Ok(Self {
            dir,
            state: RwLock::new(state),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn write_schema(&self, state: &Collections) -> Result<()> {
        let mut collections: Vec<Collection> = state.records.keys().copied().collect();
        collections.sort();
        let schema = SchemaFile {
            version: state.version,
            collections: collections.iter().map(|c| c.name().to_string()).collect(),
        };
        write_atomic(&self.dir.join(SCHEMA_FILE), &serde_json::to_string_pretty(&schema)?).await
    }

    async fn write_collection(&self, state: &Collections, collection: Collection) -> Result<()> {
        let records: Vec<&Value> = state.existing(collection)?.values().collect();
        write_atomic(
            &collection_path(&self.dir, collection),
            &serde_json::to_string(&records)?,
        )
        .await
    }
}

#[async_trait]
impl DocumentStore for FileDocumentStore {
    async fn stored_version(&self) -> Result<u32> {
        Ok(self.state.read().await.version)
    }

    async fn set_version(&self, version: u32) -> Result<()> {
        let mut state = self.state.write().await;
        state.version = version;
        self.write_schema(&state).await
    }

    async fn create_collection(&self, collection: Collection) -> Result<()> {
        let mut state = self.state.write().await;
        if state.records.contains_key(&collection) {
            return Ok(());
        }
        state.create(collection);
        self.write_collection(&state, collection).await?;
        self.write_schema(&state).await
    }

    async fn put(&self, collection: Collection, record: Value) -> Result<()> {
        let mut state = self.state.write().await;
        state.put(collection, record)?;
        self.write_collection(&state, collection).await
    }

    async fn get(&self, collection: Collection, key: &RecordKey) -> Result<Option<Value>> {
        Ok(self.state.read().await.existing(collection)?.get(key).cloned())
    }

    async fn get_all(&self, collection: Collection) -> Result<Vec<Value>> {
        Ok(self.state.read().await.existing(collection)?.values().cloned().collect())
    }

    async fn delete(&self, collection: Collection, key: &RecordKey) -> Result<()> {
        let mut state = self.state.write().await;
        if state.existing_mut(collection)?.remove(key).is_some() {
            self.write_collection(&state, collection).await?;
        }
        Ok(())
    }

    async fn clear(&self, collection: Collection) -> Result<()> {
        let mut state = self.state.write().await;
        state.existing_mut(collection)?.clear();
        self.write_collection(&state, collection).await
    }
}

fn collection_path(dir: &Path, collection: Collection) -> PathBuf {
    dir.join(format!("{}.json", collection.name()))
}

async fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path).await {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let staging = path.with_extension("tmp");
    fs::write(&staging, contents).await?;
    fs::rename(&staging, path).await?;
    Ok(())
}
