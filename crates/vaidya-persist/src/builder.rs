use std::path::Path;
use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::documents::{Database, DocumentStore, MemoryDocumentStore, SCHEMA_VERSION};
use crate::error::{PersistError, Result};
use crate::primary::{FileKeyValueStore, KeyValueBackend, MemoryKeyValueStore, PrimaryStore};
use crate::PersistClient;

pub struct PersistClientBuilder {
    primary_backend: Option<Arc<dyn KeyValueBackend>>,
    document_store: Option<Arc<dyn DocumentStore>>,
    schema_version: u32,
    clock: Arc<dyn Clock>,
}

impl PersistClientBuilder {
    pub fn new() -> Self {
        Self {
            primary_backend: None,
            document_store: None,
            schema_version: SCHEMA_VERSION,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn primary_backend(mut self, backend: Arc<dyn KeyValueBackend>) -> Self {
        self.primary_backend = Some(backend);
        self
    }

    /// Use a [`FileKeyValueStore`] rooted at `dir`.
    pub fn primary_dir(self, dir: impl AsRef<Path>) -> Result<Self> {
        let backend = FileKeyValueStore::open(dir.as_ref())?;
        Ok(self.primary_backend(Arc::new(backend)))
    }

    pub fn document_store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.document_store = Some(store);
        self
    }

    pub fn schema_version(mut self, version: u32) -> Self {
        self.schema_version = version;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Both backends default to in-memory stores. The document store is
    /// opened lazily, on the first operation.
    pub fn build(self) -> Result<PersistClient> {
        if self.schema_version == 0 {
            return Err(PersistError::Internal("schema_version must be at least 1".to_string()));
        }
        let backend = self
            .primary_backend
            .unwrap_or_else(|| Arc::new(MemoryKeyValueStore::new()));
        let store = self
            .document_store
            .unwrap_or_else(|| Arc::new(MemoryDocumentStore::new()));

        let primary = PrimaryStore::new(backend, Arc::clone(&self.clock));
        let database = Database::lazy(store, self.schema_version);
        Ok(PersistClient::new(primary, database, self.clock))
    }
}

impl Default for PersistClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
