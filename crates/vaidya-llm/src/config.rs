// Configuration layer for provider-agnostic LLM client creation
// This module provides a factory pattern for creating chat clients from configuration

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::openai::{OpenAIClient, GROQ_API_BASE, OPENAI_API_BASE};
use crate::traits::ChatClient;

/// Type of LLM provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    #[default]
    Groq,
    OpenAI,
}

/// Complete provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub provider: ProviderType,
    pub api_key: String,
    /// Overrides the provider's default endpoint (self-hosted or proxied gateways)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl ProviderConfig {
    /// Create Groq provider config
    pub fn groq(api_key: impl Into<String>) -> Self {
        Self {
            provider: ProviderType::Groq,
            api_key: api_key.into(),
            base_url: None,
        }
    }

    /// Create OpenAI provider config
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self {
            provider: ProviderType::OpenAI,
            api_key: api_key.into(),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Get the provider type
    pub fn provider_type(&self) -> ProviderType {
        self.provider.clone()
    }

    /// Endpoint the client will talk to
    pub fn resolved_base_url(&self) -> &str {
        match (&self.base_url, &self.provider) {
            (Some(url), _) => url,
            (None, ProviderType::Groq) => GROQ_API_BASE,
            (None, ProviderType::OpenAI) => OPENAI_API_BASE,
        }
    }
}

/// Factory for creating chat clients from configuration
pub struct ClientFactory;

impl ClientFactory {
    /// Create a chat client from provider configuration
    pub fn create_chat_client(config: ProviderConfig) -> Result<Arc<dyn ChatClient>> {
        let client = OpenAIClient::with_base_url(config.api_key.clone(), config.resolved_base_url())?;
        Ok(Arc::new(client))
    }
}
