//! Error types for the extraction client

use statement_graph_domain::{StatementId, ValidationError};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while talking to the LLM
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractorError {
    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(String),

    /// The call did not finish in time
    #[error("LLM call timed out after {0:?}")]
    Timeout(Duration),

    /// Text exceeds maximum length
    #[error("Text too long: {0} chars (max: {1})")]
    TextTooLong(usize, usize),

    /// Response is not the expected JSON document
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),

    /// A statement of the batch got no assignment
    #[error("No topic assigned to statement {0}")]
    MissingStatement(StatementId),

    /// A statement of the batch was assigned more than once
    #[error("Statement {0} assigned more than once")]
    DuplicateStatement(StatementId),

    /// The response mentions a statement that is not in the batch
    #[error("Unknown statement id in response: {0}")]
    UnknownStatement(String),

    /// Input rejected before calling the LLM
    #[error("Validation error: {0}")]
    Validation(String),
}

impl ExtractorError {
    /// Whether the call ran out of time
    pub fn is_timeout(&self) -> bool {
        matches!(self, ExtractorError::Timeout(_))
    }

    /// Whether the input itself was rejected
    pub fn is_validation(&self) -> bool {
        matches!(self, ExtractorError::Validation(_) | ExtractorError::TextTooLong(..))
    }
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::InvalidFormat(format!("JSON parse error: {}", e))
    }
}

impl From<ValidationError> for ExtractorError {
    fn from(e: ValidationError) -> Self {
        ExtractorError::InvalidFormat(e.to_string())
    }
}
