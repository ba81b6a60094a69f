//! LLM prompt engineering for extraction, matching, and topic generation

use crate::error::ExtractorError;
use crate::types::PromptStatement;
use statement_graph_domain::traits::CompletionRequest;
use statement_graph_domain::{Statement, Topic};

/// Builds a system prompt plus a tagged user message
pub(crate) struct PromptBuilder {
    instructions: &'static str,
    output_format: &'static str,
    intent: Option<String>,
    sections: Vec<(&'static str, String)>,
}

impl PromptBuilder {
    fn new(instructions: &'static str, output_format: &'static str) -> Self {
        Self {
            instructions,
            output_format,
            intent: None,
            sections: Vec::new(),
        }
    }

    /// Extra guidance from the caller, ignored when blank
    pub fn with_intent(mut self, intent: Option<&str>) -> Self {
        self.intent = intent
            .map(str::trim)
            .filter(|i| !i.is_empty())
            .map(str::to_string);
        self
    }

    fn section(mut self, tag: &'static str, body: String) -> Self {
        self.sections.push((tag, body));
        self
    }

    /// Build the request
    pub fn build(&self, max_tokens: u32) -> CompletionRequest {
        let mut system = String::from(self.instructions);

        if let Some(intent) = &self.intent {
            system.push_str("\n\nAdditional guidance from the requester:\n");
            system.push_str(intent);
        }

        system.push_str("\n\n");
        system.push_str(self.output_format);

        let mut user = String::new();
        for (tag, body) in &self.sections {
            user.push_str(&format!("<{tag}>\n{body}\n</{tag}>\n\n"));
        }

        CompletionRequest::new(system, user.trim_end(), max_tokens)
    }
}

/// Prompt asking for the statements contained in a transcript
pub(crate) fn extraction(text: &str) -> PromptBuilder {
    PromptBuilder::new(EXTRACTION_INSTRUCTIONS, EXTRACTION_FORMAT).section("transcript", text.to_string())
}

/// Prompt asking for one topic per statement of a batch
pub(crate) fn matching(batch: &[Statement], candidates: &[Topic]) -> Result<PromptBuilder, ExtractorError> {
    let statements: Vec<PromptStatement<'_>> = batch
        .iter()
        .map(|s| PromptStatement {
            statement_id: s.id.to_string(),
            label: &s.label,
            subject: &s.subject,
            predicate: &s.predicate,
            object: &s.object,
            context: &s.context,
        })
        .collect();
    let labels: Vec<&str> = candidates.iter().map(|t| t.label.as_str()).collect();

    Ok(PromptBuilder::new(MATCHING_INSTRUCTIONS, MATCHING_FORMAT)
        .section("statements", serde_json::to_string_pretty(&statements)?)
        .section("topics", serde_json::to_string_pretty(&labels)?))
}

/// Prompt asking for an initial set of topics covering the statements
pub(crate) fn topic_generation(statements: &[Statement]) -> PromptBuilder {
    let listing = statements
        .iter()
        .map(|s| format!("- {}", s.label))
        .collect::<Vec<_>>()
        .join("\n");

    PromptBuilder::new(TOPIC_GENERATION_INSTRUCTIONS, TOPIC_GENERATION_FORMAT).section("statements", listing)
}

const EXTRACTION_INSTRUCTIONS: &str = r#"You extract factual statements from conversation transcripts.

Break the transcript inside <transcript> tags into discrete, atomic statements.
Each statement is a subject / predicate / object triple:

- subject: the entity the statement is about, as named in the text ("Alice", "the project")
- predicate: a short snake_case relation ("has_pet", "works_at", "prefers")
- object: the value or entity ("Dog", "Acme Corp", "morning meetings")
- context: optional qualifier such as time, place, or condition; empty when none
- label: optional short human-readable sentence; empty to let the system derive it
- confidence: 0.0-1.0, lower when the speaker hedges
- source: the words from the transcript the statement was drawn from

Rules:
- One idea per statement
- Resolve pronouns to the entity they refer to when the transcript makes it clear
- Skip greetings, filler, and questions that assert nothing
- Do not invent facts that are not stated or directly implied"#;

const EXTRACTION_FORMAT: &str = r#"Output format (a single JSON object, no additional text):
{
  "statements": [
    {
      "subject": "Alice",
      "predicate": "has_pet",
      "object": "Dog",
      "context": "",
      "label": "",
      "confidence": 0.95,
      "source": "Alice has a dog."
    }
  ]
}

Return {"statements": []} when the transcript contains no statements."#;

const MATCHING_INSTRUCTIONS: &str = r#"You organize statements into topics.

For every statement inside <statements> tags choose exactly one topic:
- prefer the most relevant existing topic listed inside <topics> tags, using its label verbatim
- when none fits, propose a concise new topic label of one to three words in Title Case

Rules:
- Assign every statement_id exactly once and do not add ids that are not in the input
- Match on meaning, not on shared words
- Keep new topics broad enough to group related statements ("Pets", not "Alice's Dog")"#;

const MATCHING_FORMAT: &str = r#"Output format (a single JSON object, no additional text):
{
  "assignments": [
    {"statement_id": "<id from the input>", "topic": "<topic label>"}
  ]
}"#;

const TOPIC_GENERATION_INSTRUCTIONS: &str = r#"You design a small taxonomy of topics.

Read the statements inside <statements> tags and propose between three and ten topics that
together cover them. Each topic has a concise label of one to three words in Title Case and a
one-sentence description."#;

const TOPIC_GENERATION_FORMAT: &str = r#"Output format (a single JSON object, no additional text):
{
  "topics": [
    {"label": "Pets", "description": "Animals people keep and care for."}
  ]
}"#;
