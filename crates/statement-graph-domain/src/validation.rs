//! Validation errors raised by the domain value objects

use std::fmt;

/// Reasons a value was rejected before reaching a store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was missing or blank after trimming
    MissingField(&'static str),

    /// A field exceeded its maximum length
    TooLong {
        /// Name of the offending field
        field: &'static str,
        /// Maximum allowed length in characters
        max: usize,
        /// Actual length in characters
        actual: usize,
    },

    /// A numeric field was outside its allowed range
    OutOfRange {
        /// Name of the offending field
        field: &'static str,
        /// Human readable description of the problem
        detail: String,
    },

    /// An identifier string could not be parsed
    InvalidId {
        /// The rejected input
        value: String,
        /// Parser error message
        reason: String,
    },

    /// The request as a whole carried nothing to ingest
    EmptyInput(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingField(field) => {
                write!(f, "required field '{}' is missing or empty", field)
            }
            ValidationError::TooLong { field, max, actual } => {
                write!(f, "field '{}' is {} characters long (max: {})", field, actual, max)
            }
            ValidationError::OutOfRange { field, detail } => {
                write!(f, "field '{}' is out of range: {}", field, detail)
            }
            ValidationError::InvalidId { value, reason } => {
                write!(f, "invalid identifier '{}': {}", value, reason)
            }
            ValidationError::EmptyInput(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Trim a required field, failing when nothing is left
pub(crate) fn required(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims() {
        assert_eq!(required("subject", "  Alice ").unwrap(), "Alice");
    }

    #[test]
    fn test_required_rejects_blank() {
        assert_eq!(
            required("subject", " \t\n"),
            Err(ValidationError::MissingField("subject"))
        );
    }

    #[test]
    fn test_display_messages() {
        let err = ValidationError::TooLong { field: "label", max: 10, actual: 12 };
        assert_eq!(err.to_string(), "field 'label' is 12 characters long (max: 10)");

        let err = ValidationError::MissingField("object");
        assert!(err.to_string().contains("'object'"));
    }
}
