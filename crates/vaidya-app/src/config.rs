use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use vaidya_llm::ProviderType;
use vaidya_persist::{DATABASE_NAME, SCHEMA_VERSION};

const REDACTED: &str = "<redacted>";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub storage: StorageConfig,
    pub llm: LlmConfig,
    pub logging: LoggingConfig,

    // Secrets (from ENV only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mongodb_uri: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root for the key-value files and the local document store
    pub data_dir: PathBuf,
    /// Database name when a MongoDB document store is used
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: ProviderType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

fn default_database() -> String {
    DATABASE_NAME.to_string()
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl StorageConfig {
    pub fn primary_dir(&self) -> PathBuf {
        self.data_dir.join("kv")
    }

    pub fn documents_dir(&self) -> PathBuf {
        self.data_dir.join("documents")
    }
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. {dir}/default.toml
    /// 2. {dir}/{ENV}.toml (ENV defaults to `dev`)
    /// 3. Environment variables `VAIDYA_<SECTION>__<KEY>`, e.g. `VAIDYA_LLM__MODEL`
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let dir = dir.as_ref();
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let builder = ConfigLoader::builder()
            .add_source(File::from(dir.join("default")).required(false))
            .add_source(File::from(dir.join(&env)).required(false))
            .add_source(
                Environment::with_prefix("VAIDYA")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut cfg: Config = builder.build()?.try_deserialize()?;

        // Secrets come from ENV (not TOML). The API key is only demanded by
        // commands that talk to the model.
        cfg.llm_api_key = std::env::var("LLM_API_KEY").ok().filter(|k| !k.is_empty());
        cfg.mongodb_uri = std::env::var("MONGODB_URI").ok().filter(|u| !u.is_empty());

        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        ConfigLoader::builder()
            .add_source(File::from(path.as_ref()))
            .build()?
            .try_deserialize()
    }

    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.llm_api_key
            .as_deref()
            .ok_or_else(|| ConfigError::Message("LLM_API_KEY environment variable is required".to_string()))
    }

    /// Copy safe to print: secrets replaced by a marker.
    pub fn redacted(&self) -> Self {
        let mut cfg = self.clone();
        cfg.llm_api_key = cfg.llm_api_key.map(|_| REDACTED.to_string());
        cfg.mongodb_uri = cfg.mongodb_uri.map(|_| REDACTED.to_string());
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [storage]
        data_dir = "/tmp/vaidya"

        [llm]
        provider = "openai"
        model = "gpt-4o-mini"
        temperature = 0.5
        max_tokens = 1000
        top_p = 0.8

        [logging]
        level = "debug"
        format = "json"
    "#;

    #[test]
    fn test_config_structure() {
        let config: Config = toml::from_str(SAMPLE).unwrap();
        assert_eq!(config.storage.data_dir, PathBuf::from("/tmp/vaidya"));
        assert_eq!(config.storage.database, DATABASE_NAME);
        assert_eq!(config.storage.schema_version, SCHEMA_VERSION);
        assert_eq!(config.llm.provider, ProviderType::OpenAI);
        assert_eq!(config.llm.max_tokens, 1000);
        assert!(config.llm_api_key.is_none());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vaidya.toml");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.storage.primary_dir(), PathBuf::from("/tmp/vaidya/kv"));
    }

    #[test]
    fn test_redacted_hides_secrets() {
        let mut config: Config = toml::from_str(SAMPLE).unwrap();
        config.llm_api_key = Some("gsk-secret".to_string());

        let printed = toml::to_string_pretty(&config.redacted()).unwrap();
        assert!(!printed.contains("gsk-secret"));
        assert!(printed.contains(REDACTED));
        assert_eq!(config.require_api_key().unwrap(), "gsk-secret");
    }
}
