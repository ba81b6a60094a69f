//! Matcher reports and ingestion results

use crate::request::TranscriptionId;
use serde::{Serialize, Serializer};
use statement_graph_domain::{StatementId, TopicId};
use std::fmt::Display;

fn as_string<T: Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

fn all_as_strings<T: Display, S: Serializer>(values: &[T], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(values.iter().map(|v| v.to_string()))
}

/// A statement linked to a thematic topic
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicMatch {
    /// Linked statement
    #[serde(serialize_with = "as_string")]
    pub statement_id: StatementId,
    /// Topic it was linked to
    #[serde(serialize_with = "as_string")]
    pub topic_id: TopicId,
    /// Display label of the topic
    pub topic_label: String,
}

/// A matching batch that did not complete
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchFailure {
    /// Zero-based batch index
    pub index: usize,
    /// Statements of the batch left without a thematic topic
    #[serde(serialize_with = "all_as_strings")]
    pub statement_ids: Vec<StatementId>,
    /// What went wrong
    pub reason: String,
}

/// Outcome of a topic-matching run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchReport {
    /// Number of batches processed
    pub batches: usize,
    /// Successful links, in statement order
    pub matches: Vec<TopicMatch>,
    /// Statements left without a thematic topic
    pub unmatched: Vec<StatementId>,
    /// Failed batches
    pub failures: Vec<BatchFailure>,
}

/// Summary returned for a completed ingestion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestionResult {
    /// Transcription the statements came from
    pub transcription_id: TranscriptionId,
    /// Dedicated transcription topic
    #[serde(serialize_with = "as_string")]
    pub topic_id: TopicId,
    /// Label of the dedicated topic
    pub topic_label: String,
    /// Number of statements persisted
    pub statements_count: usize,
    /// Ids of the persisted statements, in extraction order
    #[serde(serialize_with = "all_as_strings")]
    pub statement_ids: Vec<StatementId>,
    /// Number of statements without a thematic topic
    pub unmatched_count: usize,
    /// Statements without a thematic topic
    #[serde(serialize_with = "all_as_strings")]
    pub unmatched_statement_ids: Vec<StatementId>,
    /// Thematic topic links
    pub matches: Vec<TopicMatch>,
    /// Number of matching batches
    pub batches: usize,
    /// Matching batches that failed
    pub failed_batches: Vec<BatchFailure>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_serialize_as_strings() {
        let statement_id = StatementId::new();
        let topic_id = TopicId::new();
        let result = IngestionResult {
            transcription_id: TranscriptionId::Number(12345),
            topic_id,
            topic_label: "Transcription-12345".to_string(),
            statements_count: 1,
            statement_ids: vec![statement_id],
            unmatched_count: 0,
            unmatched_statement_ids: vec![],
            matches: vec![TopicMatch {
                statement_id,
                topic_id,
                topic_label: "Pets".to_string(),
            }],
            batches: 1,
            failed_batches: vec![],
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["transcription_id"], 12345);
        assert_eq!(json["topic_id"], topic_id.to_string());
        assert_eq!(json["statement_ids"][0], statement_id.to_string());
        assert_eq!(json["matches"][0]["topic_label"], "Pets");
        assert!(json["failed_batches"].as_array().unwrap().is_empty());
    }
}
