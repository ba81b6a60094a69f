//! Topic module - categories that statements belong to

use crate::id::uuid_id;
use crate::validation::ValidationError;
use std::fmt;

uuid_id! {
    /// Unique identifier for a topic based on UUIDv7
    TopicId
}

/// Maximum topic label length, in characters
pub const MAX_LABEL_LENGTH: usize = 200;

/// A normalized topic label
///
/// The display form is trimmed with internal whitespace runs collapsed to a
/// single space. The [`key`](TopicLabel::key) is the lowercase display form and
/// is what stores enforce uniqueness on, so `"Machine  Learning"` and
/// `" machine learning"` name the same topic.
///
/// # Examples
///
/// ```
/// use statement_graph_domain::TopicLabel;
///
/// let a = TopicLabel::new("  Machine   Learning ").unwrap();
/// let b = TopicLabel::new("machine learning").unwrap();
/// assert_eq!(a.as_str(), "Machine Learning");
/// assert_eq!(a.key(), b.key());
/// ```
#[derive(Debug, Clone)]
pub struct TopicLabel {
    display: String,
    key: String,
}

impl TopicLabel {
    /// Normalize and validate a raw label
    pub fn new(raw: &str) -> Result<Self, ValidationError> {
        let display = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        if display.is_empty() {
            return Err(ValidationError::MissingField("label"));
        }

        let actual = display.chars().count();
        if actual > MAX_LABEL_LENGTH {
            return Err(ValidationError::TooLong {
                field: "label",
                max: MAX_LABEL_LENGTH,
                actual,
            });
        }

        let key = display.to_lowercase();
        Ok(Self { display, key })
    }

    /// Display form of the label
    pub fn as_str(&self) -> &str {
        &self.display
    }

    /// Case- and whitespace-insensitive uniqueness key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Compute the key of an arbitrary label string without validating it
    pub fn key_of(raw: &str) -> String {
        raw.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
    }
}

impl PartialEq for TopicLabel {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for TopicLabel {}

impl std::hash::Hash for TopicLabel {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for TopicLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

/// A persisted topic
#[derive(Debug, Clone, PartialEq)]
pub struct Topic {
    /// Unique identifier
    pub id: TopicId,

    /// Display label (first-seen form)
    pub label: String,

    /// Short description; empty when none was provided
    pub description: String,

    /// Creation time, milliseconds since the Unix epoch
    pub created_at: u64,
}

impl Topic {
    /// Uniqueness key of this topic's label
    pub fn label_key(&self) -> String {
        TopicLabel::key_of(&self.label)
    }
}

/// Field set for creating (or reusing) a topic
#[derive(Debug, Clone, PartialEq)]
pub struct NewTopic {
    /// Normalized label
    pub label: TopicLabel,

    /// Description stored only when the topic is created
    pub description: String,
}

impl NewTopic {
    /// Topic with no description
    pub fn new(label: TopicLabel) -> Self {
        Self { label, description: String::new() }
    }

    /// Attach a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into().trim().to_string();
        self
    }

    /// Attach identity, producing the persisted form
    pub fn into_topic(self, id: TopicId, created_at: u64) -> Topic {
        Topic {
            id,
            label: self.label.display,
            description: self.description,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_normalization() {
        let label = TopicLabel::new("\tPets  and\nAnimals ").unwrap();
        assert_eq!(label.as_str(), "Pets and Animals");
        assert_eq!(label.key(), "pets and animals");
    }

    #[test]
    fn test_label_equality_ignores_case_and_spacing() {
        let a = TopicLabel::new("Science").unwrap();
        let b = TopicLabel::new("  SCIENCE ").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "Science");
        assert_eq!(b.as_str(), "SCIENCE");
    }

    #[test]
    fn test_blank_label_rejected() {
        assert_eq!(TopicLabel::new("   ").unwrap_err(), ValidationError::MissingField("label"));
    }

    #[test]
    fn test_long_label_rejected() {
        let raw = "a".repeat(MAX_LABEL_LENGTH + 1);
        assert!(matches!(TopicLabel::new(&raw), Err(ValidationError::TooLong { .. })));
    }

    #[test]
    fn test_key_of_matches_key() {
        let label = TopicLabel::new(" Deep   Learning").unwrap();
        assert_eq!(TopicLabel::key_of("deep learning  "), label.key());
    }

    #[test]
    fn test_new_topic_into_topic() {
        let topic = NewTopic::new(TopicLabel::new("Pets").unwrap())
            .with_description(" Animals people keep ")
            .into_topic(TopicId::from_value(7), 42);

        assert_eq!(topic.label, "Pets");
        assert_eq!(topic.description, "Animals people keep");
        assert_eq!(topic.created_at, 42);
        assert_eq!(topic.label_key(), "pets");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: normalizing a label twice changes nothing
            #[test]
            fn prop_normalization_idempotent(raw in "[ a-zA-Z\t]{1,40}") {
                if let Ok(label) = TopicLabel::new(&raw) {
                    let again = TopicLabel::new(label.as_str()).unwrap();
                    prop_assert_eq!(again.as_str(), label.as_str());
                    prop_assert_eq!(again.key(), label.key());
                }
            }

            /// Property: case and surrounding whitespace never change the key
            #[test]
            fn prop_key_ignores_case_and_padding(word in "[a-zA-Z]{1,20}", pad in " {0,5}") {
                let padded = format!("{pad}{}{pad}", word.to_uppercase());
                let a = TopicLabel::new(&word).unwrap();
                let b = TopicLabel::new(&padded).unwrap();
                prop_assert_eq!(a.key(), b.key());
                prop_assert_eq!(TopicLabel::key_of(&padded), a.key());
            }
        }
    }
}
