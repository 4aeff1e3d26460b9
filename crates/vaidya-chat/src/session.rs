use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use vaidya_persist::{ChatHistoryEntry, ChatTurn, FeedbackEntry, PersistClient, WriteOutcome};

use crate::assistant::RemedyAssistant;

/// Response shown while the answer is outstanding.
pub const WAITING_PLACEHOLDER: &str = "⏳ Waiting for AI response...";

/// Response shown when the request failed.
pub const FAILURE_RESPONSE: &str =
    "⚠ Failed to fetch response. Please check your connection or try again later.";

/// Raw text stored alongside [`FAILURE_RESPONSE`].
pub const FAILURE_RAW_TEXT: &str = "Error occurred while fetching response";

/// The conversation on screen plus the archived history beside it.
pub struct ChatSession {
    assistant: RemedyAssistant,
    persist: PersistClient,
    turns: Vec<ChatTurn>,
    history: Vec<ChatHistoryEntry>,
    active_chat_id: Option<i64>,
}

impl ChatSession {
    /// Starts an empty conversation with the stored history loaded.
    pub async fn open_with(assistant: RemedyAssistant, persist: PersistClient) -> Self {
        let history = persist.chat_history().load().await;
        tracing::debug!(entries = history.len(), "chat session opened");
        Self {
            assistant,
            persist,
            turns: Vec::new(),
            history,
            active_chat_id: None,
        }
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn history(&self) -> &[ChatHistoryEntry] {
        &self.history
    }

    pub fn active_chat_id(&self) -> Option<i64> {
        self.active_chat_id
    }

    /// Asks the assistant and appends the exchange. Blank input is ignored.
    ///
    /// A failed request leaves a failure notice in the turn; the rest of the
    /// conversation is untouched and nothing is retried.
    pub async fn send(&mut self, input: &str) -> Option<&ChatTurn> {
        if input.trim().is_empty() {
            return None;
        }

        self.turns.push(ChatTurn {
            text: input.to_string(),
            response: WAITING_PLACEHOLDER.to_string(),
            raw_text: String::new(),
            id: self.persist.next_id(),
            suggestions: Vec::new(),
        });
        let index = self.turns.len() - 1;

        let reply = self.assistant.ask(input).await;
        let turn = &mut self.turns[index];
        match reply {
            Ok(reply) => {
                turn.response = reply.html;
                turn.raw_text = reply.raw;
            }
            Err(e) => {
                let reason = format!("{:#}", e);
                tracing::warn!(error = %reason, "remedy request failed");
                turn.response = FAILURE_RESPONSE.to_string();
                turn.raw_text = FAILURE_RAW_TEXT.to_string();
            }
        }
        Some(&self.turns[index])
    }

    /// Archives the current conversation (when it has any question) and starts a fresh one.
    pub async fn new_chat(&mut self) -> Option<ChatHistoryEntry> {
        let turns = std::mem::take(&mut self.turns);
        self.active_chat_id = None;

        let (entry, outcome) = self.persist.chat_history().archive(turns).await?;
        if !outcome.is_complete() {
            tracing::warn!(%outcome, "conversation archived only partially");
        }
        self.history.insert(0, entry.clone());
        Some(entry)
    }

    /// Shows an archived conversation; `false` when the id is unknown.
    pub fn open(&mut self, history_id: i64) -> bool {
        match self.history.iter().find(|entry| entry.id == history_id) {
            Some(entry) => {
                self.turns = entry.chats.clone();
                self.active_chat_id = Some(history_id);
                true
            }
            None => false,
        }
    }

    pub async fn delete(&mut self, history_id: i64) -> WriteOutcome {
        self.history.retain(|entry| entry.id != history_id);
        let outcome = self.persist.chat_history().save(&self.history).await;
        if self.active_chat_id == Some(history_id) {
            self.active_chat_id = None;
            self.turns.clear();
        }
        outcome
    }

    pub async fn clear_history(&mut self) -> WriteOutcome {
        self.history.clear();
        self.turns.clear();
        self.active_chat_id = None;
        self.persist.chat_history().clear_all().await
    }

    /// Rates answer `index` of the conversation on screen.
    pub async fn feedback(&self, index: usize, positive: bool) -> Result<FeedbackEntry> {
        self.persist
            .feedback()
            .record(self.active_chat_id, index, positive)
            .await
            .context("Failed to save feedback")
    }

    pub async fn export_history(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        self.persist
            .chat_history()
            .export_to(dir)
            .await
            .context("Failed to export chat history")
    }

    /// Replaces the history with the file's contents; returns the entry count.
    pub async fn import_history(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let (history, outcome) = self
            .persist
            .chat_history()
            .import_from(path)
            .await
            .with_context(|| format!("Failed to import chat history from {}", path.display()))?;
        if outcome.is_failed() {
            anyhow::bail!("Imported history could not be stored: {}", outcome);
        }
        self.history = history;
        Ok(self.history.len())
    }

    /// Adopts a history written by another handle (see `ChatHistoryRepository::watch`).
    pub fn apply_remote_history(&mut self, history: Vec<ChatHistoryEntry>) {
        self.history = history;
    }
}
