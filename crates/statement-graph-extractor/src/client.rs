//! LLM extraction client

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::parser::{parse_assignments, parse_statements, parse_topics};
use crate::prompt;
use crate::types::{CallKind, TopicAssignment, TopicProposal};
use statement_graph_domain::traits::{CompletionRequest, LlmProvider};
use statement_graph_domain::{Statement, StatementDraft, Topic};
use std::time::Instant;
use tokio::time::timeout;
use tracing::{debug, info};

/// Turns transcripts into statement drafts and statements into topics
///
/// Every call is bounded by [`ExtractorConfig::call_timeout`], including any
/// retries the provider performs.
pub struct ExtractionClient<L: LlmProvider> {
    llm: L,
    config: ExtractorConfig,
}

impl<L: LlmProvider> ExtractionClient<L> {
    /// Create a new client
    pub fn new(llm: L, config: ExtractorConfig) -> Self {
        Self { llm, config }
    }

    /// Model used by the underlying provider
    pub fn model_name(&self) -> &str {
        self.llm.model_name()
    }

    /// Active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract statement drafts from a transcript
    pub async fn extract_statements(
        &self,
        text: &str,
        intent: Option<&str>,
    ) -> Result<Vec<StatementDraft>, ExtractorError> {
        if text.trim().is_empty() {
            return Err(ExtractorError::Validation("text is empty".to_string()));
        }

        let length = text.chars().count();
        if length > self.config.max_text_length {
            return Err(ExtractorError::TextTooLong(length, self.config.max_text_length));
        }

        let request = prompt::extraction(text)
            .with_intent(intent)
            .build(self.config.max_tokens);

        let response = self.call(CallKind::Extraction, &request).await?;
        let drafts = parse_statements(&response)?;

        info!("Extracted {} statement drafts", drafts.len());
        Ok(drafts)
    }

    /// Choose a topic for every statement of a batch
    ///
    /// The result has one assignment per statement, in batch order.
    pub async fn match_topics(
        &self,
        batch: &[Statement],
        candidates: &[Topic],
        intent: Option<&str>,
    ) -> Result<Vec<TopicAssignment>, ExtractorError> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let request = prompt::matching(batch, candidates)?
            .with_intent(intent)
            .build(self.config.max_tokens);

        let response = self.call(CallKind::Matching, &request).await?;
        parse_assignments(&response, batch)
    }

    /// Propose an initial set of topics for the statements
    pub async fn generate_topics(
        &self,
        statements: &[Statement],
        intent: Option<&str>,
    ) -> Result<Vec<TopicProposal>, ExtractorError> {
        if statements.is_empty() {
            return Ok(Vec::new());
        }

        let request = prompt::topic_generation(statements)
            .with_intent(intent)
            .build(self.config.topic_max_tokens);

        let response = self.call(CallKind::TopicGeneration, &request).await?;
        let proposals = parse_topics(&response)?;

        info!("Generated {} topic proposals", proposals.len());
        Ok(proposals)
    }

    async fn call(&self, kind: CallKind, request: &CompletionRequest) -> Result<String, ExtractorError> {
        let prompt_chars = request.system.len() + request.user.len();
        debug!("{} prompt length: {} chars", kind, prompt_chars);

        let started = Instant::now();
        let limit = self.config.call_timeout();

        let response = timeout(limit, self.llm.generate(request))
            .await
            .map_err(|_| ExtractorError::Timeout(limit))?
            .map_err(|e| ExtractorError::Llm(e.to_string()))?;

        let elapsed_ms = started.elapsed().as_millis();
        if self.config.trace_calls {
            info!(
                call = %kind,
                model = self.llm.model_name(),
                prompt_chars,
                response_chars = response.len(),
                elapsed_ms = elapsed_ms as u64,
                "LLM call completed"
            );
        } else {
            debug!("{} response length: {} chars in {} ms", kind, response.len(), elapsed_ms);
        }

        Ok(response)
    }
}
