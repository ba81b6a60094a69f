//! Server configuration.
//!
//! Loaded from a TOML file or from environment variables. Every section falls
//! back to its defaults when absent.

use serde::{Deserialize, Serialize};
use statement_graph_extractor::ExtractorConfig;
use statement_graph_ingest::PipelineConfig;
use statement_graph_llm::{LlmSettings, ProviderKind};
use statement_graph_store::{StoreSettings, DEFAULT_SQLITE_PATH};
use std::fmt::Display;
use std::num::NonZeroUsize;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Default listen address
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";

/// Default listen port
pub const DEFAULT_BIND_PORT: u16 = 8000;

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// An environment variable holds an unusable value
    #[error("Invalid value for {var}: {message}")]
    Env {
        /// Variable name
        var: &'static str,
        /// What was wrong with it
        message: String,
    },

    /// Settings were read but do not make sense together
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level server configuration
///
/// ```toml
/// bind_address = "127.0.0.1"
/// bind_port = 8000
///
/// [store]
/// backend = "sqlite"
/// path = "graph.db"
///
/// [llm]
/// provider = "anthropic"
/// api_key = "sk-..."
///
/// [llm.retry]
/// max_attempts = 3
///
/// [extractor]
/// call_timeout_secs = 60
///
/// [pipeline]
/// batch_size = 30
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1")
    pub bind_address: String,

    /// Bind port (e.g., 8000)
    pub bind_port: u16,

    /// Graph store backend
    pub store: StoreSettings,

    /// LLM provider
    pub llm: LlmSettings,

    /// Extraction client tuning
    pub extractor: ExtractorConfig,

    /// Ingestion pipeline tuning
    pub pipeline: PipelineConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            bind_port: DEFAULT_BIND_PORT,
            store: StoreSettings::default(),
            llm: LlmSettings::default(),
            extractor: ExtractorConfig::default(),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: ServerConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = ServerConfig::default();

        if let Some(address) = get("BIND_ADDRESS") {
            config.bind_address = address;
        }
        if let Some(port) = parsed(&get, "BIND_PORT")? {
            config.bind_port = port;
        }

        config.store = match get("STORE_BACKEND").as_deref().map(str::to_lowercase).as_deref() {
            None | Some("sqlite") => StoreSettings::Sqlite {
                path: get("SQLITE_PATH").unwrap_or_else(|| DEFAULT_SQLITE_PATH.to_string()),
            },
            Some("neo4j") => StoreSettings::Neo4j {
                uri: get("NEO4J_URI").unwrap_or_default(),
                username: get("NEO4J_USERNAME").unwrap_or_else(|| "neo4j".to_string()),
                password: get("NEO4J_PASSWORD").unwrap_or_default(),
            },
            Some(other) => {
                return Err(ConfigError::Env {
                    var: "STORE_BACKEND",
                    message: format!("unknown backend '{}'", other),
                })
            }
        };

        if let Some(provider) = parsed::<ProviderKind>(&get, "LLM_PROVIDER")? {
            config.llm.provider = provider;
        }
        match config.llm.provider {
            ProviderKind::Anthropic => {
                config.llm.api_key = get("ANTHROPIC_API_KEY");
                config.llm.model = get("ANTHROPIC_MODEL");
                config.llm.base_url = get("ANTHROPIC_BASE_URL");
            }
            ProviderKind::Ollama => {
                config.llm.model = get("OLLAMA_MODEL");
                config.llm.base_url = get("OLLAMA_ENDPOINT");
            }
        }
        if let Some(retries) = parsed::<u32>(&get, "LLM_MAX_RETRIES")? {
            config.llm.retry.max_attempts = retries.saturating_add(1);
        }
        if let Some(backoff) = parsed(&get, "LLM_RETRY_BACKOFF_MS")? {
            config.llm.retry.initial_backoff_ms = backoff;
        }

        if let Some(timeout) = parsed(&get, "LLM_TIMEOUT_SECS")? {
            config.extractor.call_timeout_secs = timeout;
        }
        if let Some(tracing) = parsed(&get, "LLM_TRACING")? {
            config.extractor.trace_calls = tracing;
        }

        if let Some(batch_size) = parsed::<NonZeroUsize>(&get, "MATCH_BATCH_SIZE")? {
            config.pipeline.batch_size = batch_size;
        }
        if let Some(timeout) = parsed(&get, "STORE_TIMEOUT_SECS")? {
            config.pipeline.store_timeout_secs = timeout;
        }
        if let Some(seed) = parsed(&get, "SEED_TOPICS")? {
            config.pipeline.seed_topics = seed;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bind_address.trim().is_empty() {
            return Err(ConfigError::Invalid("bind_address must not be empty".to_string()));
        }

        let sections = [
            ("store", self.store.validate()),
            ("llm", self.llm.validate()),
            ("extractor", self.extractor.validate()),
            ("pipeline", self.pipeline.validate()),
        ];
        for (section, result) in sections {
            result.map_err(|e| ConfigError::Invalid(format!("[{}] {}", section, e)))?;
        }

        Ok(())
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}

fn parsed<T>(get: &impl Fn(&str) -> Option<String>, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    get(var)
        .map(|raw| {
            raw.parse::<T>().map_err(|e| ConfigError::Env {
                var,
                message: e.to_string(),
            })
        })
        .transpose()
}
