//! Statement module - the atomic fact extracted from a transcription

use crate::id::uuid_id;
use crate::validation::{required, ValidationError};

uuid_id! {
    /// Unique identifier for a statement based on UUIDv7
    ///
    /// # Examples
    ///
    /// ```
    /// use statement_graph_domain::StatementId;
    ///
    /// let id = StatementId::new();
    /// let parsed = StatementId::parse(&id.to_string()).unwrap();
    /// assert_eq!(id, parsed);
    /// ```
    StatementId
}

/// Maximum length of any single statement field, in characters
pub const MAX_FIELD_LENGTH: usize = 2_000;

/// A persisted statement
///
/// Statements are immutable once created. The store assigns `id` and
/// `created_at`; everything else comes from a validated [`NewStatement`].
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// Unique identifier
    pub id: StatementId,

    /// Human-readable name
    pub label: String,

    /// Who or what the statement is about
    pub subject: String,

    /// Action or relation
    pub predicate: String,

    /// Target of the action or relation
    pub object: String,

    /// Free-text qualifying information (may be empty)
    pub context: String,

    /// Creation time, milliseconds since the Unix epoch
    pub created_at: u64,
}

/// A statement proposed by the LLM before persistence
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatementDraft {
    /// Subject of the triple
    pub subject: String,
    /// Predicate of the triple
    pub predicate: String,
    /// Object of the triple
    pub object: String,
    /// Proposed label; derived from the triple when empty
    pub label: String,
    /// Qualifying context
    pub context: String,
    /// Model confidence in [0.0, 1.0], when reported
    pub confidence: Option<f64>,
    /// Source snippet the statement was drawn from, when reported
    pub source: Option<String>,
}

/// Validated field set for creating a statement
///
/// Construction is the only place statement fields are checked; a store can
/// rely on every `NewStatement` having non-empty subject, predicate, object,
/// and label.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStatement {
    label: String,
    subject: String,
    predicate: String,
    object: String,
    context: String,
}

impl NewStatement {
    /// Validate and build a new statement field set
    ///
    /// A blank `label` is derived as `"<subject> <predicate> <object>"`,
    /// followed by the context when there is one, and cut to
    /// [`MAX_FIELD_LENGTH`] characters.
    ///
    /// # Examples
    ///
    /// ```
    /// use statement_graph_domain::NewStatement;
    ///
    /// let s = NewStatement::new("", "Alice", "has_pet", "Dog", "").unwrap();
    /// assert_eq!(s.label(), "Alice has_pet Dog");
    ///
    /// assert!(NewStatement::new("x", "Alice", " ", "Dog", "").is_err());
    /// ```
    pub fn new(
        label: &str,
        subject: &str,
        predicate: &str,
        object: &str,
        context: &str,
    ) -> Result<Self, ValidationError> {
        let subject = required("subject", subject)?;
        let predicate = required("predicate", predicate)?;
        let object = required("object", object)?;
        let context = context.trim().to_string();

        let label = label.trim().to_string();

        for (field, value) in [
            ("label", &label),
            ("subject", &subject),
            ("predicate", &predicate),
            ("object", &object),
            ("context", &context),
        ] {
            let actual = value.chars().count();
            if actual > MAX_FIELD_LENGTH {
                return Err(ValidationError::TooLong { field, max: MAX_FIELD_LENGTH, actual });
            }
        }

        let label = if !label.is_empty() {
            label
        } else if context.is_empty() {
            derived_label(&[subject.as_str(), predicate.as_str(), object.as_str()])
        } else {
            derived_label(&[
                subject.as_str(),
                predicate.as_str(),
                object.as_str(),
                context.as_str(),
            ])
        };

        Ok(Self { label, subject, predicate, object, context })
    }

    /// Validate a draft produced by the LLM
    pub fn from_draft(draft: &StatementDraft) -> Result<Self, ValidationError> {
        if let Some(confidence) = draft.confidence {
            if !(0.0..=1.0).contains(&confidence) {
                return Err(ValidationError::OutOfRange {
                    field: "confidence",
                    detail: format!("{} not in [0.0, 1.0]", confidence),
                });
            }
        }
        Self::new(&draft.label, &draft.subject, &draft.predicate, &draft.object, &draft.context)
    }

    /// Label of the statement
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Subject of the statement
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Predicate of the statement
    pub fn predicate(&self) -> &str {
        &self.predicate
    }

    /// Object of the statement
    pub fn object(&self) -> &str {
        &self.object
    }

    /// Context of the statement
    pub fn context(&self) -> &str {
        &self.context
    }

    /// Attach store-assigned identity, producing the persisted form
    pub fn into_statement(self, id: StatementId, created_at: u64) -> Statement {
        Statement {
            id,
            label: self.label,
            subject: self.subject,
            predicate: self.predicate,
            object: self.object,
            context: self.context,
            created_at,
        }
    }
}

/// Space-joined parts, cut to `MAX_FIELD_LENGTH` characters
fn derived_label(parts: &[&str]) -> String {
    let joined = parts.join(" ");
    match joined.char_indices().nth(MAX_FIELD_LENGTH) {
        Some((cut, _)) => joined[..cut].trim_end().to_string(),
        None => joined,
    }
}

/// Exact-match filter over statement attributes
///
/// Every `Some` field must match; `None` fields are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatementFilter {
    /// Match by identifier
    pub id: Option<StatementId>,
    /// Match by label
    pub label: Option<String>,
    /// Match by subject
    pub subject: Option<String>,
    /// Match by predicate
    pub predicate: Option<String>,
    /// Match by object
    pub object: Option<String>,
    /// Match by context
    pub context: Option<String>,
    /// Maximum results to return
    pub limit: Option<usize>,
}

impl StatementFilter {
    /// Filter that selects a single statement by id
    pub fn by_id(id: StatementId) -> Self {
        Self { id: Some(id), ..Self::default() }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_id_display_and_parse() {
        let id = StatementId::new();
        let id_str = id.to_string();

        // UUIDv7 strings are 36 characters (8-4-4-4-12 with hyphens)
        assert_eq!(id_str.len(), 36);
        assert_eq!(StatementId::parse(&id_str).unwrap(), id);
        assert_eq!(id_str.parse::<StatementId>().unwrap(), id);
    }

    #[test]
    fn test_statement_id_invalid_string() {
        assert!(StatementId::parse("not-a-valid-uuid").is_err());
        assert!(StatementId::parse("").is_err());
    }

    #[test]
    fn test_statement_id_chronological() {
        let id1 = StatementId::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let id2 = StatementId::new();

        assert!(id1 < id2, "Earlier UUIDv7 should be less than later UUIDv7");
        assert!(id1.timestamp() <= id2.timestamp());
    }

    #[test]
    fn test_new_statement_trims_fields() {
        let s = NewStatement::new(" Pet ", " Alice ", " has_pet", "Dog ", " at home ").unwrap();
        assert_eq!(s.label(), "Pet");
        assert_eq!(s.subject(), "Alice");
        assert_eq!(s.predicate(), "has_pet");
        assert_eq!(s.object(), "Dog");
        assert_eq!(s.context(), "at home");
    }

    #[test]
    fn test_label_derived_with_context() {
        let s = NewStatement::new("", "Alice", "has_pet", "Dog", "since 2020").unwrap();
        assert_eq!(s.label(), "Alice has_pet Dog since 2020");
    }

    #[test]
    fn test_missing_fields_rejected() {
        assert_eq!(
            NewStatement::new("l", "", "p", "o", "").unwrap_err(),
            ValidationError::MissingField("subject")
        );
        assert_eq!(
            NewStatement::new("l", "s", "", "o", "").unwrap_err(),
            ValidationError::MissingField("predicate")
        );
        assert_eq!(
            NewStatement::new("l", "s", "p", "  ", "").unwrap_err(),
            ValidationError::MissingField("object")
        );
    }

    #[test]
    fn test_field_too_long() {
        let long = "x".repeat(MAX_FIELD_LENGTH + 1);
        let err = NewStatement::new("l", &long, "p", "o", "").unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { field: "subject", .. }));
    }

    #[test]
    fn test_long_derived_label_is_cut() {
        let context = "y".repeat(MAX_FIELD_LENGTH);
        let s = NewStatement::new("", "Alice", "has_pet", "Dog", &context).unwrap();

        assert_eq!(s.label().chars().count(), MAX_FIELD_LENGTH);
        assert!(s.label().starts_with("Alice has_pet Dog y"));
        assert_eq!(s.context(), context);
    }

    #[test]
    fn test_given_label_too_long_rejected() {
        let long = "x".repeat(MAX_FIELD_LENGTH + 1);
        let err = NewStatement::new(&long, "s", "p", "o", "").unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { field: "label", .. }));
    }

    #[test]
    fn test_from_draft_rejects_bad_confidence() {
        let draft = StatementDraft {
            subject: "Alice".into(),
            predicate: "has_pet".into(),
            object: "Dog".into(),
            confidence: Some(1.5),
            ..StatementDraft::default()
        };
        assert!(matches!(
            NewStatement::from_draft(&draft),
            Err(ValidationError::OutOfRange { field: "confidence", .. })
        ));
    }
}
