//! Configuration for the extraction client

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default bound on one LLM call, retries included (seconds)
pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 60;

/// Configuration for the extraction client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Maximum time for a single LLM call, retries included (seconds)
    pub call_timeout_secs: u64,

    /// Maximum input text length (characters)
    pub max_text_length: usize,

    /// Token budget for extraction and matching responses
    pub max_tokens: u32,

    /// Token budget for topic generation responses
    pub topic_max_tokens: u32,

    /// Log every LLM call at info level with sizes and latency
    pub trace_calls: bool,
}

impl ExtractorConfig {
    /// Get the call timeout as a Duration
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.call_timeout_secs == 0 {
            return Err("call_timeout_secs must be greater than 0".to_string());
        }
        if self.max_text_length == 0 {
            return Err("max_text_length must be greater than 0".to_string());
        }
        if self.max_tokens == 0 || self.topic_max_tokens == 0 {
            return Err("token budgets must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            call_timeout_secs: DEFAULT_CALL_TIMEOUT_SECS,
            max_text_length: 100_000,
            max_tokens: 16_000,
            topic_max_tokens: 4_000,
            trace_calls: false,
        }
    }
}
