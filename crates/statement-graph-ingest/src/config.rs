//! Pipeline configuration

use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::time::Duration;

/// Default number of statements per matching batch
pub const DEFAULT_BATCH_SIZE: usize = 30;

/// Default bound on a single store call (seconds)
pub const DEFAULT_STORE_TIMEOUT_SECS: u64 = 10;

/// Default prefix of the per-transcription topic
pub const DEFAULT_TRANSCRIPTION_PREFIX: &str = "Transcription-";

/// Configuration for the ingestion pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Statements per topic-matching batch
    pub batch_size: NonZeroUsize,

    /// Maximum time for a single store call (seconds)
    pub store_timeout_secs: u64,

    /// Label prefix of the dedicated per-transcription topic
    pub transcription_topic_prefix: String,

    /// Ask the LLM for an initial taxonomy when no thematic topics exist
    pub seed_topics: bool,
}

impl PipelineConfig {
    /// Get the store timeout as a Duration
    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.store_timeout_secs == 0 {
            return Err("store_timeout_secs must be greater than 0".to_string());
        }
        if self.transcription_topic_prefix.trim().is_empty() {
            return Err("transcription_topic_prefix must not be empty".to_string());
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: NonZeroUsize::new(DEFAULT_BATCH_SIZE).unwrap_or(NonZeroUsize::MIN),
            store_timeout_secs: DEFAULT_STORE_TIMEOUT_SECS,
            transcription_topic_prefix: DEFAULT_TRANSCRIPTION_PREFIX.to_string(),
            seed_topics: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.batch_size.get(), 30);
        assert_eq!(config.store_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_zero_batch_size_rejected_at_parse() {
        let result: Result<PipelineConfig, _> = toml::from_str("batch_size = 0");
        assert!(result.is_err());
    }

    #[test]
    fn test_partial_toml() {
        let config: PipelineConfig = toml::from_str("batch_size = 5\nseed_topics = false").unwrap();
        assert_eq!(config.batch_size.get(), 5);
        assert!(!config.seed_topics);
        assert_eq!(config.transcription_topic_prefix, "Transcription-");
    }

    #[test]
    fn test_blank_prefix_rejected() {
        let config = PipelineConfig {
            transcription_topic_prefix: " ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
