use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;

use crate::clock::{Clock, IdGenerator};
use crate::documents::{Collection, Database};
use crate::error::{PersistError, Result};
use crate::models::{StorageEnvelope, Unwrapped};
use crate::primary::{PrimaryStore, StorageSubscription};
use crate::repositories::{AppointmentRepository, ChatHistoryRepository, FeedbackRepository};

/// What happened to one backend during a fan-out write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendStatus {
    Written,
    Failed(String),
    /// The write was not attempted against this backend.
    Skipped,
}

impl BackendStatus {
    pub fn is_written(&self) -> bool {
        matches!(self, BackendStatus::Written)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, BackendStatus::Failed(_))
    }

    fn from_result<T>(result: &Result<T>) -> Self {
        match result {
            Ok(_) => BackendStatus::Written,
            Err(e) => BackendStatus::Failed(e.to_string()),
        }
    }
}

impl fmt::Display for BackendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendStatus::Written => f.write_str("written"),
            BackendStatus::Failed(reason) => write!(f, "failed ({})", reason),
            BackendStatus::Skipped => f.write_str("skipped"),
        }
    }
}

/// Result of a write that fans out to both backends.
///
/// The two writes are independent: there is no cross-backend transaction, so
/// one side can succeed while the other fails. Callers decide what a partial
/// write means for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    pub primary: BackendStatus,
    pub fallback: BackendStatus,
}

impl WriteOutcome {
    /// Neither backend failed.
    pub fn is_complete(&self) -> bool {
        !self.primary.is_failed() && !self.fallback.is_failed()
    }

    /// One backend took the write and the other did not.
    pub fn is_partial(&self) -> bool {
        self.any_written() && !self.is_complete()
    }

    pub fn is_failed(&self) -> bool {
        !self.any_written()
    }

    pub fn any_written(&self) -> bool {
        self.primary.is_written() || self.fallback.is_written()
    }

    /// `Unavailable` when no backend took the write.
    pub fn into_result(self) -> Result<()> {
        if self.is_failed() {
            Err(PersistError::Unavailable(self.to_string()))
        } else {
            Ok(())
        }
    }
}

impl fmt::Display for WriteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "primary {}, fallback {}", self.primary, self.fallback)
    }
}

/// The storage port: one primary key-value store, one document database.
#[derive(Clone)]
pub struct PersistClient {
    primary: PrimaryStore,
    database: Database,
    clock: Arc<dyn Clock>,
    ids: Arc<IdGenerator>,
}

impl PersistClient {
    pub fn new(primary: PrimaryStore, database: Database, clock: Arc<dyn Clock>) -> Self {
        Self {
            primary,
            database,
            clock,
            ids: Arc::new(IdGenerator::new()),
        }
    }

    pub fn builder() -> crate::PersistClientBuilder {
        crate::PersistClientBuilder::new()
    }

    /// Same backends, new primary-store handle identity.
    pub fn new_handle(&self) -> Self {
        Self {
            primary: self.primary.reopen(),
            ..self.clone()
        }
    }

    pub fn primary(&self) -> &PrimaryStore {
        &self.primary
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Timestamp id, strictly greater than any this client handed out before.
    pub fn next_id(&self) -> i64 {
        self.ids.next(self.clock.as_ref())
    }

    /// Saves under `key` in the primary store and mirrors into `chats` with id `key`.
    pub async fn save_data<T: Serialize + ?Sized>(
        &self,
        key: &str,
        data: &T,
        expiry_days: Option<u32>,
    ) -> WriteOutcome {
        self.save_data_as(key, key, data, expiry_days).await
    }

    /// Like [`save_data`](Self::save_data) with an explicit mirror record id.
    pub async fn save_data_as<T: Serialize + ?Sized>(
        &self,
        key: &str,
        mirror_id: &str,
        data: &T,
        expiry_days: Option<u32>,
    ) -> WriteOutcome {
        let item = match self.primary.encode(data, expiry_days) {
            Ok(item) => item,
            Err(e) => {
                tracing::warn!(key, error = %e, "value could not be serialized; nothing written");
                return WriteOutcome {
                    primary: BackendStatus::Failed(e.to_string()),
                    fallback: BackendStatus::Skipped,
                };
            }
        };

        let primary = self.primary.store(key, &item);
        if let Err(e) = &primary {
            tracing::warn!(key, error = %e, "primary store write failed; relying on document store");
        }

        let mirror = json!({
            "id": mirror_id,
            "data": item,
            "updatedAt": self.clock.now().to_rfc3339(),
        });
        let fallback = self.database.put(Collection::Chats, mirror).await;
        if let Err(e) = &fallback {
            tracing::warn!(key, mirror_id, error = %e, "document store mirror write failed");
        }

        WriteOutcome {
            primary: BackendStatus::from_result(&primary),
            fallback: BackendStatus::from_result(&fallback),
        }
    }

    /// Primary store first, then the `chats` mirror with id `key`.
    pub async fn load_data(&self, key: &str) -> Option<Value> {
        self.load_data_as(key, key).await
    }

    pub async fn load_data_as(&self, key: &str, mirror_id: &str) -> Option<Value> {
        if let Some(value) = self.primary.load(key) {
            return Some(value);
        }
        match self.load_mirror(mirror_id).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(key, mirror_id, error = %e, "document store read failed");
                None
            }
        }
    }

    /// Typed [`load_data_as`](Self::load_data_as); a value of the wrong shape reads as `None`.
    pub async fn load_as<T: DeserializeOwned>(&self, key: &str, mirror_id: &str) -> Option<T> {
        let value = self.load_data_as(key, mirror_id).await?;
        match serde_json::from_value(value) {
            Ok(typed) => Some(typed),
            Err(e) => {
                tracing::warn!(key, error = %e, "stored value has unexpected shape");
                None
            }
        }
    }

    async fn load_mirror(&self, mirror_id: &str) -> Result<Option<Value>> {
        let Some(mut record) = self.database.get(Collection::Chats, mirror_id).await? else {
            return Ok(None);
        };
        let stored = record
            .as_object_mut()
            .and_then(|map| map.remove("data"))
            .unwrap_or(Value::Null);
        if stored.is_null() {
            return Ok(None);
        }
        match StorageEnvelope::read(stored, self.clock.now_millis()) {
            Unwrapped::Live(value) => Ok(Some(value)),
            Unwrapped::Expired => {
                tracing::debug!(mirror_id, "mirrored value expired");
                self.database.delete(Collection::Chats, mirror_id).await?;
                Ok(None)
            }
        }
    }

    /// Removes `key` from the primary store and its mirror from `chats`.
    pub async fn clear_data(&self, key: &str) -> WriteOutcome {
        self.clear_data_as(key, key).await
    }

    pub async fn clear_data_as(&self, key: &str, mirror_id: &str) -> WriteOutcome {
        let primary = self.primary.remove(key);
        let fallback = self.database.delete(Collection::Chats, mirror_id).await;
        self.log_clear(key, &primary, &fallback);
        WriteOutcome {
            primary: BackendStatus::from_result(&primary),
            fallback: BackendStatus::from_result(&fallback),
        }
    }

    /// Removes `key` from the primary store and empties `collection`.
    pub async fn clear_collection(&self, key: &str, collection: Collection) -> WriteOutcome {
        let primary = self.primary.remove(key);
        let fallback = self.database.clear(collection).await;
        self.log_clear(key, &primary, &fallback);
        WriteOutcome {
            primary: BackendStatus::from_result(&primary),
            fallback: BackendStatus::from_result(&fallback),
        }
    }

    fn log_clear(&self, key: &str, primary: &Result<()>, fallback: &Result<()>) {
        if let Err(e) = primary {
            tracing::warn!(key, error = %e, "primary store clear failed");
        }
        if let Err(e) = fallback {
            tracing::warn!(key, error = %e, "document store clear failed");
        }
    }

    /// Every record in `collection`, for inspection.
    pub async fn dump(&self, collection: Collection) -> Result<Vec<Value>> {
        self.database.get_all(collection).await
    }

    /// Changes to the primary store made through other handles.
    pub fn subscribe(&self) -> StorageSubscription {
        self.primary.subscribe()
    }

    pub fn appointments(&self) -> AppointmentRepository {
        AppointmentRepository::new(self.clone())
    }

    pub fn chat_history(&self) -> ChatHistoryRepository {
        ChatHistoryRepository::new(self.clone())
    }

    pub fn feedback(&self) -> FeedbackRepository {
        FeedbackRepository::new(self.clone())
    }
}

impl fmt::Debug for PersistClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistClient")
            .field("handle", &self.primary.handle_id())
            .field("schema_version", &self.database.version())
            .finish()
    }
}
