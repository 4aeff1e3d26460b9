use crate::client::PersistClient;
use crate::documents::Collection;
use crate::error::Result;
use crate::models::FeedbackEntry;

#[derive(Clone)]
pub struct FeedbackRepository {
    client: PersistClient,
}

impl FeedbackRepository {
    pub fn new(client: PersistClient) -> Self {
        Self { client }
    }

    /// Appends a thumbs up/down for answer `message_index` of conversation `chat_id`.
    pub async fn record(
        &self,
        chat_id: Option<i64>,
        message_index: usize,
        is_positive: bool,
    ) -> Result<FeedbackEntry> {
        let entry = FeedbackEntry {
            id: self.client.next_id(),
            chat_id,
            message_index,
            is_positive,
            timestamp: self.client.clock().now(),
        };
        self.client
            .database()
            .put(Collection::Feedback, serde_json::to_value(&entry)?)
            .await?;
        tracing::debug!(id = entry.id, ?chat_id, message_index, is_positive, "feedback recorded");
        Ok(entry)
    }

    /// All feedback, oldest first.
    pub async fn list(&self) -> Result<Vec<FeedbackEntry>> {
        let mut entries = self
            .client
            .database()
            .get_all(Collection::Feedback)
            .await?
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<FeedbackEntry>, _>>()?;
        entries.sort_by_key(|entry| entry.id);
        Ok(entries)
    }
}
