use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::DAY_MS;

/// Days an archived conversation is advertised as valid.
pub const HISTORY_TTL_DAYS: i64 = 30;

/// One question/answer exchange with the remedy assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurn {
    pub text: String,
    /// Rendered markup shown to the user
    #[serde(default)]
    pub response: String,
    /// Unformatted model output (what "copy" puts on the clipboard)
    #[serde(default)]
    pub raw_text: String,
    pub id: i64,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// An archived conversation.
///
/// Immutable once stored; it can only be deleted. `expires_at` is advisory:
/// storage never enforces it, readers filter with [`ChatHistoryEntry::is_expired`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatHistoryEntry {
    pub id: i64,
    pub chats: Vec<ChatTurn>,
    pub preview: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl ChatHistoryEntry {
    /// Archives `chats`, previewed by the first turn's text.
    pub fn new(id: i64, chats: Vec<ChatTurn>, created_at: DateTime<Utc>) -> Self {
        let preview = chats.first().map(|c| c.text.clone()).unwrap_or_default();
        let expires_at = Some(created_at.timestamp_millis() + HISTORY_TTL_DAYS * DAY_MS);
        Self {
            id,
            chats,
            preview,
            created_at,
            expires_at,
        }
    }

    pub fn is_expired(&self, now_millis: i64) -> bool {
        self.expires_at.is_some_and(|deadline| now_millis > deadline)
    }

    /// Preview trimmed for list display (40 chars, then an ellipsis).
    pub fn short_preview(&self) -> String {
        if self.preview.chars().count() > 40 {
            let head: String = self.preview.chars().take(40).collect();
            format!("{}...", head)
        } else {
            self.preview.clone()
        }
    }
}
