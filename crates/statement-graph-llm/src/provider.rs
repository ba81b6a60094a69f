//! Runtime provider selection

use crate::retry::RetryPolicy;
use crate::{anthropic, ollama, AnthropicProvider, LlmError, OllamaProvider};
use serde::{Deserialize, Serialize};
use statement_graph_domain::traits::{CompletionRequest, LlmProvider as LlmProviderTrait};

/// Which HTTP provider to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Anthropic Messages API
    #[default]
    Anthropic,
    /// Local Ollama server
    Ollama,
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "anthropic" => Ok(ProviderKind::Anthropic),
            "ollama" => Ok(ProviderKind::Ollama),
            other => Err(format!("unknown LLM provider '{}'", other)),
        }
    }
}

/// LLM provider settings
///
/// `model` and `base_url` fall back to the provider's defaults when unset.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Provider to use
    pub provider: ProviderKind,

    /// Model identifier
    pub model: Option<String>,

    /// API key (Anthropic only)
    pub api_key: Option<String>,

    /// API base URL or Ollama endpoint
    pub base_url: Option<String>,

    /// Retry behavior for transient failures
    pub retry: RetryPolicy,
}

impl LlmSettings {
    /// Model that will be used, after defaults
    pub fn effective_model(&self) -> String {
        match (&self.model, self.provider) {
            (Some(model), _) if !model.trim().is_empty() => model.trim().to_string(),
            (_, ProviderKind::Anthropic) => anthropic::DEFAULT_MODEL.to_string(),
            (_, ProviderKind::Ollama) => ollama::DEFAULT_MODEL.to_string(),
        }
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<(), String> {
        if self.provider == ProviderKind::Anthropic
            && self.api_key.as_deref().map_or(true, |k| k.trim().is_empty())
        {
            return Err("api_key is required for the anthropic provider".to_string());
        }
        self.retry.validate()
    }
}

/// LLM provider selected at runtime
pub enum Provider {
    /// Anthropic Messages API
    Anthropic(AnthropicProvider),
    /// Ollama
    Ollama(OllamaProvider),
}

impl Provider {
    /// Build the provider described by `settings`
    pub fn from_settings(settings: &LlmSettings) -> Result<Self, LlmError> {
        settings.validate().map_err(LlmError::Configuration)?;
        let model = settings.effective_model();

        match settings.provider {
            ProviderKind::Anthropic => {
                let api_key = settings.api_key.clone().unwrap_or_default();
                let mut provider =
                    AnthropicProvider::new(api_key, model)?.with_retry_policy(settings.retry);
                if let Some(base_url) = &settings.base_url {
                    provider = provider.with_base_url(base_url.as_str());
                }
                Ok(Provider::Anthropic(provider))
            }
            ProviderKind::Ollama => {
                let endpoint = settings
                    .base_url
                    .clone()
                    .unwrap_or_else(|| ollama::DEFAULT_ENDPOINT.to_string());
                let provider = OllamaProvider::new(endpoint, model)?.with_retry_policy(settings.retry);
                Ok(Provider::Ollama(provider))
            }
        }
    }
}

impl LlmProviderTrait for Provider {
    type Error = LlmError;

    fn model_name(&self) -> &str {
        match self {
            Provider::Anthropic(p) => p.model_name(),
            Provider::Ollama(p) => p.model_name(),
        }
    }

    async fn generate(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        match self {
            Provider::Anthropic(p) => p.generate(request).await,
            Provider::Ollama(p) => p.generate(request).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anthropic_requires_key() {
        let settings = LlmSettings::default();
        assert!(settings.validate().is_err());
        assert!(matches!(
            Provider::from_settings(&settings),
            Err(LlmError::Configuration(_))
        ));
    }

    #[test]
    fn test_anthropic_from_settings() {
        let settings = LlmSettings {
            api_key: Some("key".to_string()),
            ..Default::default()
        };
        let provider = Provider::from_settings(&settings).unwrap();
        assert!(matches!(provider, Provider::Anthropic(_)));
        assert_eq!(provider.model_name(), anthropic::DEFAULT_MODEL);
    }

    #[test]
    fn test_ollama_from_settings() {
        let settings = LlmSettings {
            provider: ProviderKind::Ollama,
            model: Some("mistral".to_string()),
            ..Default::default()
        };
        let provider = Provider::from_settings(&settings).unwrap();
        assert!(matches!(provider, Provider::Ollama(_)));
        assert_eq!(provider.model_name(), "mistral");
    }

    #[test]
    fn test_provider_kind_from_str() {
        assert_eq!("Anthropic".parse::<ProviderKind>().unwrap(), ProviderKind::Anthropic);
        assert_eq!(" ollama ".parse::<ProviderKind>().unwrap(), ProviderKind::Ollama);
        assert!("openai".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_settings_from_toml() {
        let settings: LlmSettings = toml::from_str(
            r#"
            provider = "ollama"
            model = "llama3"

            [retry]
            max_attempts = 5
            "#,
        )
        .unwrap();

        assert_eq!(settings.provider, ProviderKind::Ollama);
        assert_eq!(settings.retry.max_attempts, 5);
        assert_eq!(settings.retry.initial_backoff_ms, 1_000);
        assert!(settings.validate().is_ok());
    }
}
