//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Implementations live in `statement-graph-store` and `statement-graph-llm`.
//! Methods return `Send` futures so callers can run inside multi-threaded
//! servers without boxing.

use crate::{NewStatement, NewTopic, Statement, StatementFilter, StatementId, Topic, TopicId};
use std::future::Future;

/// Trait for persisting statements, topics, and their relationships
///
/// Implemented by the infrastructure layer (statement-graph-store)
pub trait GraphStore: Send + Sync {
    /// Error type for store operations
    type Error: std::error::Error + Send + Sync + 'static;

    /// Write a new statement node, assigning its id and creation time
    fn create_statement(
        &self,
        statement: NewStatement,
    ) -> impl Future<Output = Result<Statement, Self::Error>> + Send;

    /// Create a topic, or return the existing one whose label key matches
    fn create_topic(
        &self,
        topic: NewTopic,
    ) -> impl Future<Output = Result<Topic, Self::Error>> + Send;

    /// Link a statement to a topic; a no-op when the link already exists
    ///
    /// Fails when either endpoint does not exist.
    fn link_statement_to_topic(
        &self,
        statement_id: StatementId,
        topic_id: TopicId,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// All topics in insertion order
    fn list_topics(&self) -> impl Future<Output = Result<Vec<Topic>, Self::Error>> + Send;

    /// Statements matching every set field of the filter, in insertion order
    fn find_statements(
        &self,
        filter: &StatementFilter,
    ) -> impl Future<Output = Result<Vec<Statement>, Self::Error>> + Send;

    /// Topics a statement belongs to
    fn topics_for_statement(
        &self,
        statement_id: StatementId,
    ) -> impl Future<Output = Result<Vec<Topic>, Self::Error>> + Send;
}

/// A single prompt/response exchange with a text model
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Instructions for the model
    pub system: String,

    /// User message carrying the payload
    pub user: String,

    /// Upper bound on generated tokens
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Build a request
    pub fn new(system: impl Into<String>, user: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            max_tokens,
        }
    }
}

/// Trait for LLM provider operations
///
/// Implemented by the infrastructure layer (statement-graph-llm)
pub trait LlmProvider: Send + Sync {
    /// Error type for LLM operations
    type Error: std::error::Error + Send + Sync + 'static;

    /// Model identifier used for requests
    fn model_name(&self) -> &str;

    /// Generate a text completion
    fn generate(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send;
}
