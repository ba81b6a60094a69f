//! Statement Graph LLM Provider Layer
//!
//! Pluggable LLM provider implementations.
//!
//! # Architecture
//!
//! This crate provides implementations of the `LlmProvider` trait from
//! `statement-graph-domain`. It supports multiple LLM backends with a common
//! interface and a shared [`RetryPolicy`].
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `AnthropicProvider`: Anthropic Messages API
//! - `OllamaProvider`: Local Ollama API integration
//! - `Provider`: runtime selection between the HTTP providers from [`LlmSettings`]
//!
//! # Examples
//!
//! ```
//! use statement_graph_llm::MockProvider;
//! use statement_graph_domain::traits::{CompletionRequest, LlmProvider};
//!
//! # tokio_test_block(async {
//! let provider = MockProvider::new("Hello from LLM!");
//! let request = CompletionRequest::new("system", "test prompt", 64);
//! let result = provider.generate(&request).await.unwrap();
//! assert_eq!(result, "Hello from LLM!");
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f)
//! # }
//! ```

#![warn(missing_docs)]

pub mod anthropic;
pub mod ollama;
pub mod provider;
pub mod retry;

use statement_graph_domain::traits::{CompletionRequest, LlmProvider as LlmProviderTrait};
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;

pub use anthropic::AnthropicProvider;
pub use ollama::OllamaProvider;
pub use provider::{LlmSettings, Provider, ProviderKind};
pub use retry::RetryPolicy;

/// Errors that can occur during LLM operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// API key rejected
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Provider could not be built from its settings
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

impl LlmError {
    /// Whether repeating the same request may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, LlmError::Communication(_) | LlmError::RateLimitExceeded)
    }
}

type Responder = Arc<dyn Fn(&CompletionRequest) -> Result<String, LlmError> + Send + Sync>;

#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Error(LlmError),
}

impl MockReply {
    fn into_result(self) -> Result<String, LlmError> {
        match self {
            MockReply::Text(text) => Ok(text),
            MockReply::Error(e) => Err(e),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Mock LLM provider for deterministic testing
///
/// This provider returns pre-configured responses without making any network calls.
/// Replies are chosen in this order:
///
/// 1. the next entry of the FIFO script ([`push_response`](MockProvider::push_response),
///    [`push_error`](MockProvider::push_error))
/// 2. the responder closure, when one is set
/// 3. the first keyed reply whose key occurs in the user message or system prompt
/// 4. the default response
///
/// # Examples
///
/// ```
/// use statement_graph_llm::MockProvider;
///
/// let mut provider = MockProvider::default();
/// provider.add_response("<statements>", r#"{"assignments": []}"#);
/// provider.push_response(r#"{"statements": []}"#);
/// assert_eq!(provider.call_count(), 0);
/// ```
#[derive(Clone)]
pub struct MockProvider {
    model: String,
    default_response: String,
    responses: Arc<Mutex<Vec<(String, MockReply)>>>,
    script: Arc<Mutex<VecDeque<MockReply>>>,
    responder: Option<Responder>,
    delay: Option<Duration>,
    call_count: Arc<Mutex<usize>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            model: "mock-model".to_string(),
            default_response: response.into(),
            responses: Arc::new(Mutex::new(Vec::new())),
            script: Arc::new(Mutex::new(VecDeque::new())),
            responder: None,
            delay: None,
            call_count: Arc::new(Mutex::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Report a different model name
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sleep before every reply
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Compute replies with a closure
    pub fn with_responder<F>(mut self, responder: F) -> Self
    where
        F: Fn(&CompletionRequest) -> Result<String, LlmError> + Send + Sync + 'static,
    {
        self.responder = Some(Arc::new(responder));
        self
    }

    /// Reply with `response` whenever `key` occurs in the prompt
    pub fn add_response(&mut self, key: impl Into<String>, response: impl Into<String>) {
        lock(&self.responses).push((key.into(), MockReply::Text(response.into())));
    }

    /// Fail with `error` whenever `key` occurs in the prompt
    pub fn add_error(&mut self, key: impl Into<String>, error: LlmError) {
        lock(&self.responses).push((key.into(), MockReply::Error(error)));
    }

    /// Queue a one-shot response
    pub fn push_response(&self, response: impl Into<String>) {
        lock(&self.script).push_back(MockReply::Text(response.into()));
    }

    /// Queue a one-shot error
    pub fn push_error(&self, error: LlmError) {
        lock(&self.script).push_back(MockReply::Error(error));
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        *lock(&self.call_count)
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        *lock(&self.call_count) = 0;
    }

    /// Every request received so far, oldest first
    pub fn requests(&self) -> Vec<CompletionRequest> {
        lock(&self.requests).clone()
    }

    fn reply(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        *lock(&self.call_count) += 1;
        lock(&self.requests).push(request.clone());

        if let Some(scripted) = lock(&self.script).pop_front() {
            return scripted.into_result();
        }

        if let Some(responder) = &self.responder {
            return responder(request);
        }

        let responses = lock(&self.responses);
        let keyed = responses
            .iter()
            .find(|(key, _)| request.user.contains(key.as_str()) || request.system.contains(key.as_str()));
        if let Some((_, reply)) = keyed {
            return reply.clone().into_result();
        }

        Ok(self.default_response.clone())
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl fmt::Debug for MockProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockProvider")
            .field("model", &self.model)
            .field("default_response", &self.default_response)
            .field("delay", &self.delay)
            .field("call_count", &self.call_count())
            .finish()
    }
}

impl LlmProviderTrait for MockProvider {
    type Error = LlmError;

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.reply(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(user: &str) -> CompletionRequest {
        CompletionRequest::new("system prompt", user, 256)
    }

    #[tokio::test]
    async fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        let result = provider.generate(&request("any prompt")).await;
        assert_eq!(result.unwrap(), "Test response");
    }

    #[tokio::test]
    async fn test_mock_provider_keyed_responses() {
        let mut provider = MockProvider::default();
        provider.add_response("hello", "world");
        provider.add_response("foo", "bar");

        assert_eq!(provider.generate(&request("say hello")).await.unwrap(), "world");
        assert_eq!(provider.generate(&request("foo!")).await.unwrap(), "bar");
        assert_eq!(
            provider.generate(&request("unknown")).await.unwrap(),
            "Default mock response"
        );
    }

    #[tokio::test]
    async fn test_mock_provider_script_is_fifo() {
        let provider = MockProvider::new("fallback");
        provider.push_response("first");
        provider.push_error(LlmError::RateLimitExceeded);

        assert_eq!(provider.generate(&request("x")).await.unwrap(), "first");
        assert_eq!(
            provider.generate(&request("x")).await.unwrap_err(),
            LlmError::RateLimitExceeded
        );
        assert_eq!(provider.generate(&request("x")).await.unwrap(), "fallback");
    }

    #[tokio::test]
    async fn test_mock_provider_call_count() {
        let provider = MockProvider::new("test");

        assert_eq!(provider.call_count(), 0);

        provider.generate(&request("prompt1")).await.unwrap();
        assert_eq!(provider.call_count(), 1);

        provider.generate(&request("prompt2")).await.unwrap();
        assert_eq!(provider.call_count(), 2);
        assert_eq!(provider.requests()[1].user, "prompt2");

        provider.reset_call_count();
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_provider_error() {
        let mut provider = MockProvider::default();
        provider.add_error("bad prompt", LlmError::Other("Mock error".to_string()));

        let result = provider.generate(&request("a bad prompt")).await;
        assert!(matches!(result.unwrap_err(), LlmError::Other(_)));
    }

    #[tokio::test]
    async fn test_mock_provider_responder() {
        let provider = MockProvider::default()
            .with_responder(|req| Ok(format!("echo: {}", req.user)));

        assert_eq!(provider.generate(&request("ping")).await.unwrap(), "echo: ping");
    }

    #[tokio::test]
    async fn test_mock_provider_clone_shares_state() {
        let provider1 = MockProvider::new("test");
        let provider2 = provider1.clone();

        provider1.generate(&request("test")).await.unwrap();

        // Both should share the same call count due to Arc
        assert_eq!(provider1.call_count(), 1);
        assert_eq!(provider2.call_count(), 1);
    }

    #[test]
    fn test_transient_classification() {
        assert!(LlmError::Communication("reset".to_string()).is_transient());
        assert!(LlmError::RateLimitExceeded.is_transient());
        assert!(!LlmError::Authentication("bad key".to_string()).is_transient());
        assert!(!LlmError::InvalidResponse("garbage".to_string()).is_transient());
        assert!(!LlmError::ModelNotAvailable("x".to_string()).is_transient());
    }
}
