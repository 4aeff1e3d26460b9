use chrono::SecondsFormat;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::client::{PersistClient, WriteOutcome};
use crate::documents::Collection;
use crate::error::Result;
use crate::models::{ChatHistoryEntry, ChatTurn, StorageEnvelope};
use crate::primary::StorageSubscription;

/// Primary-store key holding the archived conversations.
pub const HISTORY_KEY: &str = "ayurveda_chat_history";

/// Id of the history's mirror record in `chats`.
pub const HISTORY_MIRROR_ID: &str = "current_chat_history";

/// Archived conversations, newest first.
#[derive(Clone)]
pub struct ChatHistoryRepository {
    client: PersistClient,
}

impl ChatHistoryRepository {
    pub fn new(client: PersistClient) -> Self {
        Self { client }
    }

    /// Stored history; empty when nothing is stored or it cannot be read.
    pub async fn load(&self) -> Vec<ChatHistoryEntry> {
        self.client
            .load_as(HISTORY_KEY, HISTORY_MIRROR_ID)
            .await
            .unwrap_or_default()
    }

    /// History without entries past their advisory expiry.
    pub async fn load_active(&self) -> Vec<ChatHistoryEntry> {
        let now = self.client.clock().now_millis();
        self.load()
            .await
            .into_iter()
            .filter(|entry| !entry.is_expired(now))
            .collect()
    }

    /// Replaces the stored history.
    pub async fn save(&self, history: &[ChatHistoryEntry]) -> WriteOutcome {
        self.client
            .save_data_as(HISTORY_KEY, HISTORY_MIRROR_ID, history, None)
            .await
    }

    /// Prepends `turns` as a new entry. Conversations with no non-blank
    /// question are dropped and `None` is returned.
    pub async fn archive(&self, turns: Vec<ChatTurn>) -> Option<(ChatHistoryEntry, WriteOutcome)> {
        if !turns.iter().any(|turn| !turn.text.trim().is_empty()) {
            return None;
        }
        let entry = ChatHistoryEntry::new(self.client.next_id(), turns, self.client.clock().now());

        let mut history = self.load().await;
        history.insert(0, entry.clone());
        let outcome = self.save(&history).await;
        tracing::debug!(id = entry.id, entries = history.len(), %outcome, "conversation archived");
        Some((entry, outcome))
    }

    pub async fn get(&self, id: i64) -> Option<ChatHistoryEntry> {
        self.load().await.into_iter().find(|entry| entry.id == id)
    }

    /// Drops one entry; unknown ids leave the history as it was.
    pub async fn delete(&self, id: i64) -> WriteOutcome {
        let history: Vec<ChatHistoryEntry> = self
            .load()
            .await
            .into_iter()
            .filter(|entry| entry.id != id)
            .collect();
        self.save(&history).await
    }

    /// Removes the history key and empties the whole `chats` collection.
    pub async fn clear_all(&self) -> WriteOutcome {
        self.client
            .clear_collection(HISTORY_KEY, Collection::Chats)
            .await
    }

    /// The history as a pretty-printed JSON array.
    pub async fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.load().await)?)
    }

    /// Writes `ayurveda-chat-history-<timestamp>.json` into `dir`.
    pub async fn export_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let stamp = self
            .client
            .clock()
            .now()
            .to_rfc3339_opts(SecondsFormat::Millis, true);
        let path = dir
            .as_ref()
            .join(format!("ayurveda-chat-history-{}.json", stamp));
        fs::write(&path, self.export_json().await?)?;
        tracing::info!(path = %path.display(), "chat history exported");
        Ok(path)
    }

    /// Replaces the history with a JSON array of entries.
    pub async fn import_json(&self, text: &str) -> Result<(Vec<ChatHistoryEntry>, WriteOutcome)> {
        let history: Vec<ChatHistoryEntry> = serde_json::from_str(text)?;
        let outcome = self.save(&history).await;
        tracing::info!(entries = history.len(), %outcome, "chat history imported");
        Ok((history, outcome))
    }

    pub async fn import_from(&self, path: impl AsRef<Path>) -> Result<(Vec<ChatHistoryEntry>, WriteOutcome)> {
        let text = fs::read_to_string(path)?;
        self.import_json(&text).await
    }

    /// History changes made through other handles.
    pub fn watch(&self) -> HistoryWatcher {
        HistoryWatcher {
            subscription: self.client.subscribe(),
        }
    }
}

/// Yields the new history whenever another handle rewrites it.
#[derive(Debug)]
pub struct HistoryWatcher {
    subscription: StorageSubscription,
}

impl HistoryWatcher {
    /// Next foreign change to the history; `None` once the backend is gone.
    pub async fn next(&mut self) -> Option<Vec<ChatHistoryEntry>> {
        loop {
            let event = self.subscription.recv().await?;
            if event.key == HISTORY_KEY {
                return Some(decode_history(event.new_value.as_deref()));
            }
        }
    }

    /// Non-blocking variant of [`next`](Self::next).
    pub fn try_next(&mut self) -> Option<Vec<ChatHistoryEntry>> {
        loop {
            let event = self.subscription.try_recv()?;
            if event.key == HISTORY_KEY {
                return Some(decode_history(event.new_value.as_deref()));
            }
        }
    }
}

/// A removed key reads as an empty history, as does text that does not parse.
fn decode_history(raw: Option<&str>) -> Vec<ChatHistoryEntry> {
    let Some(text) = raw else {
        return Vec::new();
    };
    let parsed = serde_json::from_str::<Value>(text)
        .map(StorageEnvelope::payload)
        .and_then(serde_json::from_value);
    match parsed {
        Ok(history) => history,
        Err(e) => {
            tracing::warn!(error = %e, "unreadable history in change notification");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_history_handles_removal_and_garbage() {
        assert!(decode_history(None).is_empty());
        assert!(decode_history(Some("not json")).is_empty());
        assert!(decode_history(Some("[]")).is_empty());
    }

    #[test]
    fn test_decode_history_reads_envelope() {
        let text = r#"{"data":[{"id":1,"chats":[],"preview":"p","createdAt":"2026-01-01T00:00:00Z"}],"expiry":0}"#;
        let history = decode_history(Some(text));
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].preview, "p");
    }
}
