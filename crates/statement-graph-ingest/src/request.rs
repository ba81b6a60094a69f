//! Ingestion request shape and validation

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a transcription, numeric or textual
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TranscriptionId {
    /// Numeric id, e.g. `12345`
    Number(i64),
    /// Textual id, e.g. `"call-2024-01-07"`
    Text(String),
}

impl fmt::Display for TranscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranscriptionId::Number(n) => write!(f, "{}", n),
            TranscriptionId::Text(s) => f.write_str(s.trim()),
        }
    }
}

/// One speaker turn of a transcription
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    /// Speaker identifier, e.g. `"A"`
    pub speaker: String,
    /// What was said
    pub text: String,
    /// Start offset in milliseconds
    pub start: f64,
    /// End offset in milliseconds
    pub end: f64,
    /// Transcription confidence in [0.0, 1.0]
    pub confidence: f64,
}

/// Information about the transcription
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionMetadata {
    /// Transcription identifier; names the dedicated topic
    pub transcription_id: TranscriptionId,
    /// Source audio file
    #[serde(default)]
    pub audio_file_id: Option<TranscriptionId>,
    /// Language code, e.g. `"en-US"`
    #[serde(default)]
    pub language: Option<String>,
    /// Speech-to-text service
    #[serde(default)]
    pub service: Option<String>,
    /// Number of distinct speakers
    #[serde(default)]
    pub speakers_count: Option<u32>,
}

/// Body of `POST /ingestion/v1`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestionRequest {
    /// Full transcription text; rebuilt from utterances when blank
    #[serde(default)]
    pub text: String,
    /// Speaker turns
    #[serde(default)]
    pub utterances: Vec<Utterance>,
    /// Transcription metadata
    pub metadata: TranscriptionMetadata,
}

impl IngestionRequest {
    /// Check the request shape
    pub fn validate(&self) -> Result<(), String> {
        if self.utterances.is_empty() && self.text.trim().is_empty() {
            return Err("request must contain at least one utterance or non-empty text".to_string());
        }

        if let TranscriptionId::Text(id) = &self.metadata.transcription_id {
            if id.trim().is_empty() {
                return Err("metadata.transcription_id must not be empty".to_string());
            }
        }

        for (idx, u) in self.utterances.iter().enumerate() {
            if !(0.0..=1.0).contains(&u.confidence) {
                return Err(format!(
                    "utterances[{}].confidence {} not in [0.0, 1.0]",
                    idx, u.confidence
                ));
            }
            if !u.start.is_finite() || !u.end.is_finite() || u.start < 0.0 {
                return Err(format!("utterances[{}] has invalid timing", idx));
            }
            if u.end < u.start {
                return Err(format!(
                    "utterances[{}].end {} is before start {}",
                    idx, u.end, u.start
                ));
            }
        }

        Ok(())
    }

    /// Text handed to extraction
    ///
    /// Uses `text` when present, otherwise one `"<speaker>: <text>"` line per
    /// utterance.
    pub fn transcript_text(&self) -> String {
        if !self.text.trim().is_empty() {
            return self.text.trim().to_string();
        }

        self.utterances
            .iter()
            .filter(|u| !u.text.trim().is_empty())
            .map(|u| format!("{}: {}", u.speaker.trim(), u.text.trim()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utterance(speaker: &str, text: &str) -> Utterance {
        Utterance {
            speaker: speaker.to_string(),
            text: text.to_string(),
            start: 0.0,
            end: 1000.0,
            confidence: 0.9,
        }
    }

    fn request(text: &str, utterances: Vec<Utterance>) -> IngestionRequest {
        IngestionRequest {
            text: text.to_string(),
            utterances,
            metadata: TranscriptionMetadata {
                transcription_id: TranscriptionId::Number(12345),
                audio_file_id: None,
                language: None,
                service: None,
                speakers_count: None,
            },
        }
    }

    #[test]
    fn test_deserialize_numeric_and_text_ids() {
        let numeric: IngestionRequest = serde_json::from_str(
            r#"{"text": "hi", "utterances": [], "metadata": {"transcription_id": 12345, "audio_file_id": 67890, "language": "en-US", "service": "assembly", "speakers_count": 2}}"#,
        )
        .unwrap();
        assert_eq!(numeric.metadata.transcription_id, TranscriptionId::Number(12345));
        assert_eq!(numeric.metadata.speakers_count, Some(2));

        let text: IngestionRequest =
            serde_json::from_str(r#"{"text": "hi", "metadata": {"transcription_id": "abc-1"}}"#)
                .unwrap();
        assert_eq!(text.metadata.transcription_id.to_string(), "abc-1");
        assert!(text.utterances.is_empty());
    }

    #[test]
    fn test_integer_timings_accepted() {
        let req: IngestionRequest = serde_json::from_str(
            r#"{"utterances": [{"speaker": "A", "text": "Hello", "start": 0, "end": 2500, "confidence": 0.95}], "metadata": {"transcription_id": 1}}"#,
        )
        .unwrap();
        assert_eq!(req.utterances[0].end, 2500.0);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_empty_request_rejected() {
        assert!(request("  ", vec![]).validate().is_err());
        assert!(request("Alice has a dog.", vec![]).validate().is_ok());
    }

    #[test]
    fn test_confidence_out_of_range_rejected() {
        let mut u = utterance("A", "Hello");
        u.confidence = 1.2;
        let err = request("", vec![u]).validate().unwrap_err();
        assert!(err.contains("confidence"));
    }

    #[test]
    fn test_end_before_start_rejected() {
        let mut u = utterance("A", "Hello");
        u.start = 3000.0;
        u.end = 2000.0;
        assert!(request("", vec![u]).validate().is_err());
    }

    #[test]
    fn test_blank_text_id_rejected() {
        let mut req = request("Hello", vec![]);
        req.metadata.transcription_id = TranscriptionId::Text("  ".to_string());
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_transcript_text_rebuilt_from_utterances() {
        let req = request(
            "",
            vec![
                utterance("A", "Hello, how are you today?"),
                utterance("B", " "),
                utterance("B", "I'm doing well."),
            ],
        );
        assert_eq!(
            req.transcript_text(),
            "A: Hello, how are you today?\nB: I'm doing well."
        );
    }

    #[test]
    fn test_transcript_text_prefers_text() {
        let req = request(" Alice has a dog. ", vec![utterance("A", "ignored")]);
        assert_eq!(req.transcript_text(), "Alice has a dog.");
    }
}
