//! Ollama Provider Implementation
//!
//! Provides integration with Ollama's local LLM API for running models
//! on-premises.
//!
//! # Features
//!
//! - Async HTTP communication with Ollama API
//! - Configurable endpoint and model
//! - Retry logic with exponential backoff
//!
//! # Examples
//!
//! ```no_run
//! use statement_graph_llm::OllamaProvider;
//!
//! let provider = OllamaProvider::new("http://localhost:11434", "llama3").unwrap();
//! ```

use crate::retry::{retry, RetryPolicy};
use crate::LlmError;
use serde::{Deserialize, Serialize};
use statement_graph_domain::traits::{CompletionRequest, LlmProvider as LlmProviderTrait};
use std::time::Duration;
use tracing::debug;

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default model
pub const DEFAULT_MODEL: &str = "llama3";

/// Per-request HTTP timeout; callers bound whole calls separately
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Ollama API provider for local LLM inference
pub struct OllamaProvider {
    endpoint: String,
    model: String,
    client: reqwest::Client,
    retry_policy: RetryPolicy,
}

/// Request body for Ollama generate API
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    num_predict: u32,
}

/// Response from Ollama generate API
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

impl OllamaProvider {
    /// Create a new Ollama provider
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Ollama API endpoint (e.g., "http://localhost:11434")
    /// - `model`: Model to use (e.g., "llama3", "mistral")
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        let model = model.into();
        if model.trim().is_empty() {
            return Err(LlmError::Configuration("model name is required".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| LlmError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model,
            client,
            retry_policy: RetryPolicy::default(),
        })
    }

    /// Create a new Ollama provider on `http://localhost:11434`
    pub fn default_endpoint(model: impl Into<String>) -> Result<Self, LlmError> {
        Self::new(DEFAULT_ENDPOINT, model)
    }

    /// Set the retry policy
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    async fn send_once(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.endpoint);

        let body = OllamaGenerateRequest {
            model: &self.model,
            prompt: &request.user,
            system: &request.system,
            stream: false,
            options: OllamaOptions { num_predict: request.max_tokens },
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LlmError::ModelNotAvailable(self.model.clone()));
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let message = format!("HTTP {}: {}", status, error_text);
            return Err(if status.is_server_error() {
                LlmError::Communication(message)
            } else {
                LlmError::Other(message)
            });
        }

        response
            .json::<OllamaGenerateResponse>()
            .await
            .map(|r| r.response)
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))
    }
}

impl LlmProviderTrait for OllamaProvider {
    type Error = LlmError;

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        debug!(
            "Ollama request: model={}, prompt_chars={}",
            self.model,
            request.system.len() + request.user.len()
        );
        retry(&self.retry_policy, "Ollama request", || self.send_once(request)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_provider_creation() {
        let provider = OllamaProvider::new("http://localhost:11434/", "llama2").unwrap();
        assert_eq!(provider.endpoint, "http://localhost:11434");
        assert_eq!(provider.model, "llama2");
        assert_eq!(provider.retry_policy, RetryPolicy::default());
    }

    #[test]
    fn test_ollama_provider_default_endpoint() {
        let provider = OllamaProvider::default_endpoint("mistral").unwrap();
        assert_eq!(provider.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(provider.model_name(), "mistral");
    }

    #[test]
    fn test_ollama_blank_model_rejected() {
        assert!(matches!(
            OllamaProvider::default_endpoint(""),
            Err(LlmError::Configuration(_))
        ));
    }

    #[test]
    fn test_request_carries_system_prompt() {
        let body = OllamaGenerateRequest {
            model: "llama3",
            prompt: "text",
            system: "instructions",
            stream: false,
            options: OllamaOptions { num_predict: 42 },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["system"], "instructions");
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["num_predict"], 42);
    }

    // Integration tests (requires running Ollama)
    #[tokio::test]
    #[ignore] // Only run when Ollama is available
    async fn test_ollama_generate_integration() {
        let provider = OllamaProvider::default_endpoint("llama3").unwrap();
        let request = CompletionRequest::new("Answer briefly.", "Say 'hello' and nothing else", 16);
        let response = provider.generate(&request).await.unwrap();
        assert!(!response.is_empty());
    }

    #[tokio::test]
    async fn test_ollama_error_handling() {
        // Nothing listens on port 1
        let provider = OllamaProvider::new("http://127.0.0.1:1", "llama2")
            .unwrap()
            .with_retry_policy(RetryPolicy::none());

        let result = provider.generate(&CompletionRequest::new("", "test", 16)).await;

        match result {
            Err(LlmError::Communication(_)) => {} // Expected
            other => panic!("Expected Communication error, got {:?}", other),
        }
    }
}
