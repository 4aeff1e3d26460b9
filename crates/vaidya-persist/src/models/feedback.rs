use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Thumbs up/down on one assistant answer. Append-only.
///
/// `chat_id` may point at a history entry that no longer exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackEntry {
    pub id: i64,
    pub chat_id: Option<i64>,
    pub message_index: usize,
    pub is_positive: bool,
    pub timestamp: DateTime<Utc>,
}
