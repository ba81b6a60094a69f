//! Ingestion orchestrator

use crate::config::PipelineConfig;
use crate::error::IngestError;
use crate::matcher::{bounded, StoreCallError, TopicMatcher};
use crate::request::IngestionRequest;
use crate::result::IngestionResult;
use crate::stage::{Stage, StageTracker};
use statement_graph_domain::traits::{GraphStore, LlmProvider};
use statement_graph_domain::{NewStatement, NewTopic, Statement, Topic, TopicLabel};
use statement_graph_extractor::ExtractionClient;
use statement_graph_store::StoreError;
use std::future::Future;
use std::sync::Arc;
use tracing::{info, warn};

/// Runs the ingestion pipeline for one request at a time
///
/// Stages:
/// 1. create the dedicated `"<prefix><transcription_id>"` topic
/// 2. extract statements from the transcript (failure aborts the request)
/// 3. persist each statement and link it to the dedicated topic
/// 4. match statements to thematic topics in batches (failures are isolated)
///
/// Requests share the store; an `Ingestor` may serve concurrent requests.
pub struct Ingestor<S, L: LlmProvider> {
    store: Arc<S>,
    client: ExtractionClient<L>,
    config: PipelineConfig,
}

impl<S, L> Ingestor<S, L>
where
    S: GraphStore<Error = StoreError>,
    L: LlmProvider,
{
    /// Create an ingestor over a shared store
    pub fn new(store: Arc<S>, client: ExtractionClient<L>, config: PipelineConfig) -> Self {
        Self { store, client, config }
    }

    /// Model used for extraction and matching
    pub fn model_name(&self) -> &str {
        self.client.model_name()
    }

    /// Shared graph store
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Pipeline configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Ingest one transcription
    pub async fn ingest(
        &self,
        request: &IngestionRequest,
        intent: Option<&str>,
    ) -> Result<IngestionResult, IngestError> {
        request.validate().map_err(IngestError::Validation)?;

        let transcription_id = request.metadata.transcription_id.clone();
        let mut tracker = StageTracker::new(transcription_id.to_string());

        let result = self.run(request, intent, &mut tracker).await;
        if let Err(e) = &result {
            tracker.fail(e);
        }
        result
    }

    async fn run(
        &self,
        request: &IngestionRequest,
        intent: Option<&str>,
        tracker: &mut StageTracker,
    ) -> Result<IngestionResult, IngestError> {
        let transcription_id = request.metadata.transcription_id.clone();
        let label = TopicLabel::new(&format!(
            "{}{}",
            self.config.transcription_topic_prefix, transcription_id
        ))
        .map_err(|e| IngestError::Validation(e.to_string()))?;

        let dedicated = self.call("create_topic", self.store.create_topic(NewTopic::new(label))).await?;
        info!("Using transcription topic '{}' ({})", dedicated.label, dedicated.id);

        tracker.advance(Stage::Extracting)?;
        let drafts = self
            .client
            .extract_statements(&request.transcript_text(), intent)
            .await?;

        tracker.advance(Stage::Persisting)?;
        let mut statements = Vec::with_capacity(drafts.len());
        for draft in &drafts {
            let new = NewStatement::from_draft(draft).map_err(|e| IngestError::Validation(e.to_string()))?;
            let statement = self.call("create_statement", self.store.create_statement(new)).await?;
            self.call(
                "link_statement_to_topic",
                self.store.link_statement_to_topic(statement.id, dedicated.id),
            )
            .await?;
            statements.push(statement);
        }
        info!("Persisted {} statements", statements.len());

        tracker.advance(Stage::Matching)?;
        let candidates = self.candidate_topics(&statements, intent).await?;
        let report = TopicMatcher::new(self.store.as_ref(), &self.client, &self.config)
            .run(&statements, candidates, intent)
            .await;

        tracker.advance(Stage::Completed)?;
        Ok(IngestionResult {
            transcription_id,
            topic_id: dedicated.id,
            topic_label: dedicated.label,
            statements_count: statements.len(),
            statement_ids: statements.iter().map(|s| s.id).collect(),
            unmatched_count: report.unmatched.len(),
            unmatched_statement_ids: report.unmatched,
            matches: report.matches,
            batches: report.batches,
            failed_batches: report.failures,
        })
    }

    /// Existing thematic topics, seeded by the LLM when there are none
    async fn candidate_topics(
        &self,
        statements: &[Statement],
        intent: Option<&str>,
    ) -> Result<Vec<Topic>, IngestError> {
        let prefix_key = TopicLabel::key_of(&self.config.transcription_topic_prefix);
        let candidates: Vec<Topic> = self
            .call("list_topics", self.store.list_topics())
            .await?
            .into_iter()
            .filter(|t| !t.label_key().starts_with(&prefix_key))
            .collect();

        if !candidates.is_empty() || !self.config.seed_topics || statements.is_empty() {
            return Ok(candidates);
        }

        let proposals = match self.client.generate_topics(statements, intent).await {
            Ok(proposals) => proposals,
            Err(e) => {
                warn!("Topic seeding failed, matching without candidates: {}", e);
                return Ok(candidates);
            }
        };

        let mut seeded = Vec::with_capacity(proposals.len());
        for proposal in proposals {
            let topic = NewTopic::new(proposal.label).with_description(proposal.description);
            match self.call("create_topic", self.store.create_topic(topic)).await {
                Ok(topic) => seeded.push(topic),
                Err(e) => warn!("Could not create seeded topic: {}", e),
            }
        }
        info!("Seeded {} topics", seeded.len());
        Ok(seeded)
    }

    async fn call<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, IngestError> {
        bounded(self.config.store_timeout(), operation, call)
            .await
            .map_err(|e| match e {
                StoreCallError::Failed(e) => IngestError::from(e),
                StoreCallError::TimedOut(operation, after) => IngestError::StoreTimeout { operation, after },
            })
    }
}
