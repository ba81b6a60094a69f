//! Statement Graph Extractor
//!
//! The LLM-facing half of ingestion: turns transcripts into statement drafts,
//! assigns topics to batches of statements, and proposes an initial topic
//! taxonomy.
//!
//! # Architecture
//!
//! ```text
//! Transcript → ExtractionClient → LLM → strict JSON parser → StatementDraft
//! Statements + Topics → ExtractionClient → LLM → strict JSON parser → TopicAssignment
//! ```
//!
//! # Key Features
//!
//! - **Per-call timeout**: every call, retries included, is bounded
//! - **Strict parsing**: a response is accepted whole or rejected whole
//! - **Batch validation**: each statement of a batch is assigned exactly once
//! - **Intent**: optional caller guidance appended to every prompt
//!
//! # Example Usage
//!
//! ```no_run
//! use statement_graph_extractor::{ExtractionClient, ExtractorConfig};
//! use statement_graph_llm::MockProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = MockProvider::new(r#"{"statements": []}"#);
//! let client = ExtractionClient::new(llm, ExtractorConfig::default());
//!
//! let drafts = client.extract_statements("Alice has a dog.", None).await?;
//! println!("Extracted {} statements", drafts.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod client;
mod config;
mod error;
mod parser;
mod prompt;
mod types;


pub use client::ExtractionClient;
pub use config::{ExtractorConfig, DEFAULT_CALL_TIMEOUT_SECS};
pub use error::ExtractorError;
pub use types::{CallKind, TopicAssignment, TopicProposal};
