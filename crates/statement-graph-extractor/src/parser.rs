//! Strict parsing of LLM output
//!
//! A response is accepted only when it is exactly the expected JSON object,
//! optionally wrapped in a Markdown code fence. A single bad element rejects
//! the whole response.

use crate::error::ExtractorError;
use crate::types::{
    AssignmentPayload, ExtractionPayload, TopicAssignment, TopicProposal, TopicsPayload,
};
use statement_graph_domain::{
    NewStatement, Statement, StatementDraft, StatementId, TopicLabel,
};
use std::collections::{HashMap, HashSet};

/// Parse `{"statements": [...]}` into validated drafts
pub fn parse_statements(response: &str) -> Result<Vec<StatementDraft>, ExtractorError> {
    let payload: ExtractionPayload = serde_json::from_str(extract_json(response)?)?;

    payload
        .statements
        .into_iter()
        .enumerate()
        .map(|(idx, wire)| {
            let draft = StatementDraft::from(wire);
            NewStatement::from_draft(&draft)
                .map(|_| draft)
                .map_err(|e| ExtractorError::InvalidFormat(format!("statement {}: {}", idx, e)))
        })
        .collect()
}

/// Parse `{"assignments": [...]}` and check it against the batch
///
/// Every batch statement must be assigned exactly once; the result follows
/// the batch order.
pub fn parse_assignments(
    response: &str,
    batch: &[Statement],
) -> Result<Vec<TopicAssignment>, ExtractorError> {
    let payload: AssignmentPayload = serde_json::from_str(extract_json(response)?)?;

    let in_batch: HashSet<StatementId> = batch.iter().map(|s| s.id).collect();
    let mut chosen: HashMap<StatementId, TopicLabel> = HashMap::with_capacity(batch.len());

    for wire in payload.assignments {
        let id = StatementId::parse(wire.statement_id.trim())
            .ok()
            .filter(|id| in_batch.contains(id))
            .ok_or_else(|| ExtractorError::UnknownStatement(wire.statement_id.clone()))?;

        let label = TopicLabel::new(&wire.topic)
            .map_err(|e| ExtractorError::InvalidFormat(format!("statement {}: {}", id, e)))?;

        if chosen.insert(id, label).is_some() {
            return Err(ExtractorError::DuplicateStatement(id));
        }
    }

    batch
        .iter()
        .map(|s| {
            chosen
                .remove(&s.id)
                .map(|topic| TopicAssignment { statement_id: s.id, topic })
                .ok_or(ExtractorError::MissingStatement(s.id))
        })
        .collect()
}

/// Parse `{"topics": [...]}`, dropping repeated labels
pub fn parse_topics(response: &str) -> Result<Vec<TopicProposal>, ExtractorError> {
    let payload: TopicsPayload = serde_json::from_str(extract_json(response)?)?;

    let mut seen = HashSet::new();
    let mut proposals = Vec::with_capacity(payload.topics.len());

    for wire in payload.topics {
        let label = TopicLabel::new(&wire.label)?;
        if seen.insert(label.key().to_string()) {
            proposals.push(TopicProposal {
                label,
                description: wire.description.trim().to_string(),
            });
        }
    }

    Ok(proposals)
}

/// Strip an optional Markdown code fence around the JSON document
fn extract_json(response: &str) -> Result<&str, ExtractorError> {
    let trimmed = response.trim();

    if !trimmed.starts_with("```") {
        return Ok(trimmed);
    }

    // Opening fence line may carry a language tag
    let body = trimmed
        .split_once('\n')
        .map(|(_, rest)| rest)
        .ok_or_else(|| ExtractorError::InvalidFormat("Empty code block".to_string()))?;

    body.trim_end()
        .strip_suffix("```")
        .map(str::trim)
        .ok_or_else(|| ExtractorError::InvalidFormat("Unterminated code block".to_string()))
}
