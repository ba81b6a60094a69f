//! Anthropic Provider Implementation
//!
//! Talks to the Anthropic Messages API (`POST /v1/messages`).
//!
//! # Examples
//!
//! ```no_run
//! use statement_graph_llm::AnthropicProvider;
//!
//! let provider = AnthropicProvider::new("sk-ant-...", "claude-3-7-sonnet-latest").unwrap();
//! ```

use crate::retry::{retry, RetryPolicy};
use crate::LlmError;
use serde::{Deserialize, Serialize};
use statement_graph_domain::traits::{CompletionRequest, LlmProvider as LlmProviderTrait};
use std::time::Duration;
use tracing::debug;

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Default model
pub const DEFAULT_MODEL: &str = "claude-3-7-sonnet-latest";

/// API version sent with every request
pub const API_VERSION: &str = "2023-06-01";

/// Per-request HTTP timeout; callers bound whole calls separately
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Anthropic Messages API provider
pub struct AnthropicProvider {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
    retry_policy: RetryPolicy,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl AnthropicProvider {
    /// Create a new provider for `model`
    ///
    /// Fails with [`LlmError::Configuration`] when the key or model is blank.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        let model = model.into();

        if api_key.trim().is_empty() {
            return Err(LlmError::Configuration("Anthropic API key is required".to_string()));
        }
        if model.trim().is_empty() {
            return Err(LlmError::Configuration("model name is required".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| LlmError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            client,
            retry_policy: RetryPolicy::default(),
        })
    }

    /// Point at a different API host (proxies, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the retry policy
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    async fn send_once(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let url = format!("{}/v1/messages", self.base_url);
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            system: &request.system,
            messages: [Message { role: "user", content: &request.user }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(classify_status(status.as_u16(), &error_text, &self.model));
        }

        let parsed = response
            .json::<MessagesResponse>()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        collect_text(parsed)
    }
}

/// Map a non-success HTTP status to an error
fn classify_status(status: u16, body: &str, model: &str) -> LlmError {
    match status {
        401 | 403 => LlmError::Authentication(format!("HTTP {}: {}", status, body)),
        404 => LlmError::ModelNotAvailable(model.to_string()),
        429 => LlmError::RateLimitExceeded,
        500..=599 => LlmError::Communication(format!("HTTP {}: {}", status, body)),
        _ => LlmError::Other(format!("HTTP {}: {}", status, body)),
    }
}

fn collect_text(response: MessagesResponse) -> Result<String, LlmError> {
    let text: String = response
        .content
        .into_iter()
        .filter(|block| block.kind == "text")
        .filter_map(|block| block.text)
        .collect();

    if text.is_empty() {
        return Err(LlmError::InvalidResponse("response contained no text blocks".to_string()));
    }
    Ok(text)
}

impl LlmProviderTrait for AnthropicProvider {
    type Error = LlmError;

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        debug!(
            "Anthropic request: model={}, prompt_chars={}, max_tokens={}",
            self.model,
            request.system.len() + request.user.len(),
            request.max_tokens
        );
        retry(&self.retry_policy, "Anthropic request", || self.send_once(request)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_creation() {
        let provider = AnthropicProvider::new("key", DEFAULT_MODEL).unwrap();
        assert_eq!(provider.model_name(), DEFAULT_MODEL);
        assert_eq!(provider.base_url, DEFAULT_BASE_URL);
        assert_eq!(provider.retry_policy, RetryPolicy::default());
    }

    #[test]
    fn test_blank_key_rejected() {
        let result = AnthropicProvider::new("  ", DEFAULT_MODEL);
        assert!(matches!(result, Err(LlmError::Configuration(_))));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let provider = AnthropicProvider::new("key", DEFAULT_MODEL)
            .unwrap()
            .with_base_url("http://localhost:8080/");
        assert_eq!(provider.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_request_body_shape() {
        let body = MessagesRequest {
            model: "m",
            max_tokens: 100,
            system: "be terse",
            messages: [Message { role: "user", content: "hi" }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "m");
        assert_eq!(json["max_tokens"], 100);
        assert_eq!(json["system"], "be terse");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hi");
    }

    #[test]
    fn test_status_classification() {
        assert!(matches!(classify_status(401, "", "m"), LlmError::Authentication(_)));
        assert!(matches!(classify_status(404, "", "m"), LlmError::ModelNotAvailable(_)));
        assert_eq!(classify_status(429, "", "m"), LlmError::RateLimitExceeded);
        assert!(classify_status(529, "overloaded", "m").is_transient());
        assert!(classify_status(503, "", "m").is_transient());
        assert!(!classify_status(400, "bad request", "m").is_transient());
    }

    #[test]
    fn test_text_blocks_concatenated() {
        let response: MessagesResponse = serde_json::from_str(
            r#"{"content": [
                {"type": "text", "text": "{\"statements\": "},
                {"type": "tool_use", "id": "x"},
                {"type": "text", "text": "[]}"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(collect_text(response).unwrap(), r#"{"statements": []}"#);
    }

    #[test]
    fn test_empty_content_is_invalid() {
        let response: MessagesResponse = serde_json::from_str(r#"{"content": []}"#).unwrap();
        assert!(matches!(collect_text(response), Err(LlmError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_communication_error() {
        let provider = AnthropicProvider::new("key", DEFAULT_MODEL)
            .unwrap()
            .with_base_url("http://127.0.0.1:1")
            .with_retry_policy(RetryPolicy::none());

        let result = provider
            .generate(&CompletionRequest::new("system", "test", 16))
            .await;
        assert!(matches!(result, Err(LlmError::Communication(_))));
    }
}
