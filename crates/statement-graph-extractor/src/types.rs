//! Results of LLM calls and the JSON documents the model returns

use serde::{Deserialize, Serialize};
use statement_graph_domain::{StatementDraft, StatementId, TopicLabel};
use std::fmt;

/// The topic chosen for one statement of a batch
#[derive(Debug, Clone, PartialEq)]
pub struct TopicAssignment {
    /// Statement the topic was chosen for
    pub statement_id: StatementId,

    /// Existing or newly proposed topic label
    pub topic: TopicLabel,
}

/// A topic proposed when no thematic topics exist yet
#[derive(Debug, Clone, PartialEq)]
pub struct TopicProposal {
    /// Normalized label
    pub label: TopicLabel,

    /// One-line description
    pub description: String,
}

/// Kind of LLM call, used for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    /// Statement extraction
    Extraction,
    /// Topic matching for one batch
    Matching,
    /// Initial taxonomy generation
    TopicGeneration,
}

impl fmt::Display for CallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CallKind::Extraction => "extraction",
            CallKind::Matching => "matching",
            CallKind::TopicGeneration => "topic_generation",
        })
    }
}

/// `{"statements": [...]}`
#[derive(Debug, Deserialize)]
pub(crate) struct ExtractionPayload {
    pub statements: Vec<WireStatement>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireStatement {
    pub subject: String,
    pub predicate: String,
    pub object: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub source: Option<String>,
}

impl From<WireStatement> for StatementDraft {
    fn from(w: WireStatement) -> Self {
        StatementDraft {
            subject: w.subject,
            predicate: w.predicate,
            object: w.object,
            label: w.label,
            context: w.context,
            confidence: w.confidence,
            source: w.source,
        }
    }
}

/// `{"assignments": [...]}`
#[derive(Debug, Deserialize)]
pub(crate) struct AssignmentPayload {
    pub assignments: Vec<WireAssignment>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireAssignment {
    pub statement_id: String,
    pub topic: String,
}

/// `{"topics": [...]}`
#[derive(Debug, Deserialize)]
pub(crate) struct TopicsPayload {
    pub topics: Vec<WireTopic>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireTopic {
    pub label: String,
    #[serde(default)]
    pub description: String,
}

/// One statement as shown to the model inside `<statements>`
#[derive(Debug, Serialize)]
pub(crate) struct PromptStatement<'a> {
    pub statement_id: String,
    pub label: &'a str,
    pub subject: &'a str,
    pub predicate: &'a str,
    pub object: &'a str,
    #[serde(skip_serializing_if = "is_blank")]
    pub context: &'a str,
}

fn is_blank(s: &&str) -> bool {
    s.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_statement_defaults() {
        let wire: WireStatement =
            serde_json::from_str(r#"{"subject": "Alice", "predicate": "has_pet", "object": "Dog"}"#)
                .unwrap();
        let draft = StatementDraft::from(wire);
        assert_eq!(draft.subject, "Alice");
        assert!(draft.label.is_empty());
        assert!(draft.confidence.is_none());
    }

    #[test]
    fn test_wire_statement_requires_triple() {
        let result: Result<WireStatement, _> =
            serde_json::from_str(r#"{"subject": "Alice", "predicate": "has_pet"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_prompt_statement_omits_empty_context() {
        let s = PromptStatement {
            statement_id: "id".to_string(),
            label: "Alice has_pet Dog",
            subject: "Alice",
            predicate: "has_pet",
            object: "Dog",
            context: "",
        };
        let json = serde_json::to_value(&s).unwrap();
        assert!(json.get("context").is_none());
        assert_eq!(json["statement_id"], "id");
    }

    #[test]
    fn test_call_kind_display() {
        assert_eq!(CallKind::TopicGeneration.to_string(), "topic_generation");
    }
}
