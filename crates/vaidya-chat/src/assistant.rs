use anyhow::{Context, Result};
use std::sync::Arc;
use vaidya_llm::{ChatClient, ChatOptions, ChatRequest, Message};

use crate::formatter::format_response;
use crate::templates::{remedy_request, REMEDY_SYSTEM_PROMPT};

pub const DEFAULT_MODEL: &str = "llama3-70b-8192";

/// Shown when the model returns no content.
pub const NO_RESPONSE: &str = "No response from AI.";

/// Sampling settings for remedy requests.
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 2000,
            top_p: 0.9,
        }
    }
}

/// A model answer in both forms the UI keeps.
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantReply {
    /// Model text as returned
    pub raw: String,
    /// Formatted markup
    pub html: String,
}

#[derive(Clone)]
pub struct RemedyAssistant {
    client: Arc<dyn ChatClient>,
    settings: AssistantSettings,
    system_prompt: String,
}

impl RemedyAssistant {
    pub fn new(client: Arc<dyn ChatClient>) -> Self {
        Self {
            client,
            settings: AssistantSettings::default(),
            system_prompt: REMEDY_SYSTEM_PROMPT.to_string(),
        }
    }

    pub fn with_settings(mut self, settings: AssistantSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn settings(&self) -> &AssistantSettings {
        &self.settings
    }

    pub fn build_request(&self, query: &str) -> ChatRequest {
        let messages = vec![
            Message::system(self.system_prompt.clone()),
            Message::human(remedy_request(query)),
        ];
        let options = ChatOptions::new()
            .temperature(self.settings.temperature)
            .max_tokens(self.settings.max_tokens)
            .top_p(self.settings.top_p);
        ChatRequest::new(self.settings.model.clone(), messages).with_options(options)
    }

    /// One completion for `query`, formatted.
    pub async fn ask(&self, query: &str) -> Result<AssistantReply> {
        let response = self
            .client
            .chat(self.build_request(query))
            .await
            .context("Remedy request failed")?;

        if let Some(usage) = &response.usage {
            tracing::debug!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "remedy answer received"
            );
        }

        let raw = response
            .content
            .filter(|content| !content.is_empty())
            .unwrap_or_else(|| NO_RESPONSE.to_string());
        let html = format_response(&raw);
        Ok(AssistantReply { raw, html })
    }
}
