//! Primary store adapter: the fast, synchronous path.
//!
//! Values are JSON text. A value saved with an expiry is wrapped in a
//! [`StorageEnvelope`]; expired values are removed lazily, on the read that
//! finds them, never by a sweep.

mod backend;
mod file;
mod memory;
mod subscription;

pub use backend::KeyValueBackend;
pub use file::FileKeyValueStore;
pub use memory::{MemoryKeyValueStore, BROWSER_QUOTA_BYTES};
pub use subscription::{ChangeNotifier, StorageEvent, StorageSubscription};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::Result;
use crate::models::{StorageEnvelope, Unwrapped};

/// Outcome of a primary-store read.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Hit(Value),
    Miss,
    /// The value was past its deadline and has just been removed.
    Expired,
}

impl Lookup {
    pub fn into_value(self) -> Option<Value> {
        match self {
            Lookup::Hit(value) => Some(value),
            Lookup::Miss | Lookup::Expired => None,
        }
    }
}

/// One handle on a key-value backend. Cloning keeps the handle identity;
/// [`PrimaryStore::reopen`] makes a new one (another tab, in browser terms).
#[derive(Clone)]
pub struct PrimaryStore {
    backend: Arc<dyn KeyValueBackend>,
    clock: Arc<dyn Clock>,
    handle: Uuid,
}

impl PrimaryStore {
    pub fn new(backend: Arc<dyn KeyValueBackend>, clock: Arc<dyn Clock>) -> Self {
        Self {
            backend,
            clock,
            handle: Uuid::new_v4(),
        }
    }

    /// A new handle on the same backend with its own identity.
    pub fn reopen(&self) -> Self {
        Self::new(Arc::clone(&self.backend), Arc::clone(&self.clock))
    }

    pub fn handle_id(&self) -> Uuid {
        self.handle
    }

    /// Stores `data` under `key`; `false` on any serialization or quota failure.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, data: &T, expiry_days: Option<u32>) -> bool {
        match self.encode(data, expiry_days).and_then(|item| self.store(key, &item)) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key, error = %e, "primary store write failed");
                false
            }
        }
    }

    /// Serializes `data` into the item that will be written (envelope or bare).
    pub fn encode<T: Serialize + ?Sized>(&self, data: &T, expiry_days: Option<u32>) -> Result<Value> {
        let value = serde_json::to_value(data)?;
        Ok(StorageEnvelope::wrap(value, expiry_days, self.clock.now_millis()))
    }

    /// Writes an already-encoded item.
    pub fn store(&self, key: &str, item: &Value) -> Result<()> {
        let text = serde_json::to_string(item)?;
        self.backend.set_item(key, &text)?;
        tracing::debug!(key, bytes = text.len(), "primary store write");
        self.notify(key, Some(text));
        Ok(())
    }

    /// The stored value, or `None` when missing, expired or unreadable.
    pub fn load(&self, key: &str) -> Option<Value> {
        match self.lookup(key) {
            Ok(found) => found.into_value(),
            Err(e) => {
                tracing::warn!(key, error = %e, "primary store read failed");
                None
            }
        }
    }

    pub fn load_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.load(key)?;
        match serde_json::from_value(value) {
            Ok(typed) => Some(typed),
            Err(e) => {
                tracing::warn!(key, error = %e, "primary store value has unexpected shape");
                None
            }
        }
    }

    pub fn lookup(&self, key: &str) -> Result<Lookup> {
        let Some(text) = self.backend.get_item(key)? else {
            return Ok(Lookup::Miss);
        };
        let stored: Value = serde_json::from_str(&text)?;
        match StorageEnvelope::read(stored, self.clock.now_millis()) {
            Unwrapped::Live(value) => Ok(Lookup::Hit(value)),
            Unwrapped::Expired => {
                tracing::debug!(key, "primary store value expired");
                self.remove(key)?;
                Ok(Lookup::Expired)
            }
        }
    }

    /// Removes `key`; missing keys are fine.
    pub fn clear(&self, key: &str) {
        if let Err(e) = self.remove(key) {
            tracing::warn!(key, error = %e, "primary store removal failed");
        }
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        self.backend.remove_item(key)?;
        self.notify(key, None);
        Ok(())
    }

    /// Whether anything is stored under `key`, expired or not.
    pub fn contains(&self, key: &str) -> bool {
        matches!(self.backend.get_item(key), Ok(Some(_)))
    }

    pub fn keys(&self) -> Result<Vec<String>> {
        self.backend.keys()
    }

    /// Changes made through other handles on this backend.
    pub fn subscribe(&self) -> StorageSubscription {
        self.backend.notifier().subscribe(self.handle)
    }

    fn notify(&self, key: &str, new_value: Option<String>) {
        self.backend.notifier().publish(StorageEvent {
            key: key.to_string(),
            new_value,
            origin: self.handle,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use serde_json::json;

    fn store() -> (PrimaryStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(1_000));
        let store = PrimaryStore::new(Arc::new(MemoryKeyValueStore::new()), clock.clone());
        (store, clock)
    }

    #[test]
    fn test_unreadable_text_loads_as_none() {
        let backend = Arc::new(MemoryKeyValueStore::new());
        backend.set_item("k", "{not json").unwrap();
        let store = PrimaryStore::new(backend, Arc::new(ManualClock::new(0)));
        assert_eq!(store.load("k"), None);
    }

    #[test]
    fn test_lookup_reports_expiry() {
        let (store, clock) = store();
        assert!(store.save("k", &json!(1), Some(1)));
        clock.advance(chrono::Duration::days(2));
        assert_eq!(store.lookup("k").unwrap(), Lookup::Expired);
        assert_eq!(store.lookup("k").unwrap(), Lookup::Miss);
    }

    #[test]
    fn test_own_writes_are_not_delivered_to_own_subscription() {
        let (store, _) = store();
        let other = store.reopen();
        let mut mine = store.subscribe();
        let mut theirs = other.subscribe();

        store.save("k", &json!("v"), None);

        assert_eq!(mine.try_recv(), None);
        let event = theirs.try_recv().unwrap();
        assert_eq!(event.key, "k");
        assert_eq!(event.new_value.as_deref(), Some("\"v\""));
    }
}
