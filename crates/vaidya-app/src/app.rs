use anyhow::{Context, Result};
use std::sync::Arc;
use vaidya_chat::{AssistantSettings, RemedyAssistant};
use vaidya_llm::{ClientFactory, ProviderConfig};
use vaidya_persist::{DocumentStore, FileDocumentStore, PersistClient};

use crate::config::Config;

/// Opens both storage backends described by `config`.
///
/// The key-value store always lives under `data_dir`. The document store is
/// MongoDB when `MONGODB_URI` is set and the `mongodb` feature is compiled
/// in, and a local file store otherwise.
pub async fn open_persist(config: &Config) -> Result<PersistClient> {
    let storage = &config.storage;
    let documents = open_document_store(config).await?;

    PersistClient::builder()
        .primary_dir(storage.primary_dir())
        .with_context(|| format!("Failed to open key-value store at {}", storage.primary_dir().display()))?
        .document_store(documents)
        .schema_version(storage.schema_version)
        .build()
        .context("Failed to build persistence client")
}

#[cfg(feature = "mongodb")]
async fn open_document_store(config: &Config) -> Result<Arc<dyn DocumentStore>> {
    if let Some(uri) = &config.mongodb_uri {
        tracing::info!(database = %config.storage.database, "Connecting to MongoDB");
        let store = vaidya_persist::MongoDocumentStore::connect(uri, &config.storage.database)
            .await
            .context("Failed to connect to MongoDB")?;
        return Ok(Arc::new(store));
    }
    open_file_store(config).await
}

#[cfg(not(feature = "mongodb"))]
async fn open_document_store(config: &Config) -> Result<Arc<dyn DocumentStore>> {
    if config.mongodb_uri.is_some() {
        tracing::warn!("MONGODB_URI is set but this build has no MongoDB support; using local documents");
    }
    open_file_store(config).await
}

async fn open_file_store(config: &Config) -> Result<Arc<dyn DocumentStore>> {
    let dir = config.storage.documents_dir();
    let store = FileDocumentStore::open(&dir)
        .await
        .with_context(|| format!("Failed to open document store at {}", dir.display()))?;
    Ok(Arc::new(store))
}

pub fn build_assistant(config: &Config) -> Result<RemedyAssistant> {
    let api_key = config.require_api_key()?;
    let mut provider = ProviderConfig::groq(api_key);
    provider.provider = config.llm.provider.clone();
    if let Some(url) = &config.llm.base_url {
        provider = provider.with_base_url(url);
    }
    tracing::debug!(endpoint = provider.resolved_base_url(), model = %config.llm.model, "Initializing LLM client");

    let client = ClientFactory::create_chat_client(provider)?;
    Ok(RemedyAssistant::new(client).with_settings(AssistantSettings {
        model: config.llm.model.clone(),
        temperature: config.llm.temperature,
        max_tokens: config.llm.max_tokens,
        top_p: config.llm.top_p,
    }))
}
