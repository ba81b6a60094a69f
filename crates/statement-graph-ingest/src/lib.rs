//! Statement Graph Ingestion Pipeline
//!
//! Turns a transcription into persisted statements organized by topic.
//!
//! # Pipeline
//!
//! ```text
//! IngestionRequest
//!   → validate
//!   → dedicated topic "Transcription-<id>"
//!   → extract statements (LLM)
//!   → persist + link to dedicated topic
//!   → batched topic matching (LLM + store)
//!   → IngestionResult
//! ```
//!
//! Extraction failures abort the request. Matching failures are isolated to
//! their batch: the affected statements are reported as unmatched and the
//! request still succeeds.
//!
//! # Example
//!
//! ```no_run
//! use statement_graph_extractor::{ExtractionClient, ExtractorConfig};
//! use statement_graph_ingest::{IngestionRequest, Ingestor, PipelineConfig};
//! use statement_graph_llm::MockProvider;
//! use statement_graph_store::SqliteGraphStore;
//! use std::sync::Arc;
//!
//! # async fn example(request: IngestionRequest) -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(SqliteGraphStore::new(":memory:")?);
//! let client = ExtractionClient::new(MockProvider::default(), ExtractorConfig::default());
//! let ingestor = Ingestor::new(store, client, PipelineConfig::default());
//!
//! let result = ingestor.ingest(&request, Some("focus on pets")).await?;
//! println!("{} statements, {} unmatched", result.statements_count, result.unmatched_count);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod batching;
mod config;
mod error;
mod matcher;
mod orchestrator;
mod request;
mod result;
pub mod stage;

pub use config::{PipelineConfig, DEFAULT_BATCH_SIZE, DEFAULT_STORE_TIMEOUT_SECS, DEFAULT_TRANSCRIPTION_PREFIX};
pub use error::IngestError;
pub use matcher::TopicMatcher;
pub use orchestrator::Ingestor;
pub use request::{IngestionRequest, TranscriptionId, TranscriptionMetadata, Utterance};
pub use result::{BatchFailure, IngestionResult, MatchReport, TopicMatch};
pub use stage::{Stage, StageTracker};
