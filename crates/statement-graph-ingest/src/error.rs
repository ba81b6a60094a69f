//! Error types for ingestion

use crate::stage::IllegalTransition;
use statement_graph_extractor::ExtractorError;
use statement_graph_store::StoreError;
use std::time::Duration;
use thiserror::Error;

/// Errors that abort an ingestion request
#[derive(Error, Debug)]
pub enum IngestError {
    /// Request rejected before any work was done
    #[error("Validation error: {0}")]
    Validation(String),

    /// Statement extraction failed
    #[error("Extraction failed: {0}")]
    Extraction(#[source] ExtractorError),

    /// Graph store failure
    #[error("Store error: {0}")]
    Store(#[source] StoreError),

    /// A node the request depends on does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A store call did not finish in time
    #[error("Store operation '{operation}' timed out after {after:?}")]
    StoreTimeout {
        /// Operation that timed out
        operation: &'static str,
        /// Configured limit
        after: Duration,
    },

    /// Pipeline invariant violated
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IngestError {
    /// Whether extraction failed because the LLM call ran out of time
    pub fn is_extraction_timeout(&self) -> bool {
        matches!(self, IngestError::Extraction(e) if e.is_timeout())
    }
}

impl From<StoreError> for IngestError {
    fn from(e: StoreError) -> Self {
        if e.is_not_found() {
            IngestError::NotFound(e.to_string())
        } else {
            IngestError::Store(e)
        }
    }
}

impl From<ExtractorError> for IngestError {
    fn from(e: ExtractorError) -> Self {
        if e.is_validation() {
            IngestError::Validation(e.to_string())
        } else {
            IngestError::Extraction(e)
        }
    }
}

impl From<IllegalTransition> for IngestError {
    fn from(e: IllegalTransition) -> Self {
        IngestError::Internal(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_split_out() {
        let err = IngestError::from(StoreError::NotFound { kind: "topic", id: "x".to_string() });
        assert!(matches!(err, IngestError::NotFound(msg) if msg == "topic not found: x"));

        let err = IngestError::from(StoreError::InvalidData("bad".to_string()));
        assert!(matches!(err, IngestError::Store(_)));
    }

    #[test]
    fn test_text_too_long_is_validation() {
        let err = IngestError::from(ExtractorError::TextTooLong(20, 10));
        assert!(matches!(err, IngestError::Validation(_)));
    }

    #[test]
    fn test_extraction_timeout_detected() {
        let err = IngestError::from(ExtractorError::Timeout(Duration::from_secs(60)));
        assert!(err.is_extraction_timeout());
        assert!(!IngestError::from(ExtractorError::Llm("x".to_string())).is_extraction_timeout());
    }
}
