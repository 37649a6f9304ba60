//! Error types for the session integrity subsystem.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The shared error type for `lectern-core`.
///
/// Field-level defects never surface here: they are downgraded to warnings and
/// repaired in place. Only record-level failures become an `IntegrityError`.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IntegrityError {
    /// Text could not be parsed as JSON
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// The value is not a session record at all
    #[error("Unrecoverable session data: {}", .errors.join("; "))]
    Unrecoverable { errors: Vec<String> },

    /// Serialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "JSON", "backup", etc.
        message: String,
    },

    /// Migration chain error
    #[error("Migration error: {0}")]
    Migration(String),

    /// A string that is not a member of a closed enumeration
    #[error("Invalid {kind} value: '{value}'")]
    InvalidEnumerant { kind: String, value: String },
}

impl IntegrityError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Creates an Unrecoverable error from validator diagnostics
    pub fn unrecoverable(errors: Vec<String>) -> Self {
        Self::Unrecoverable { errors }
    }

    /// Creates a Migration error
    pub fn migration(message: impl Into<String>) -> Self {
        Self::Migration(message.into())
    }

    /// Creates an InvalidEnumerant error
    pub fn invalid_enumerant(kind: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidEnumerant {
            kind: kind.to_string(),
            value: value.into(),
        }
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a Parse error
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }

    /// Check if the input was rejected as unrecoverable
    pub fn is_unrecoverable(&self) -> bool {
        matches!(self, Self::Unrecoverable { .. })
    }
}

impl From<serde_json::Error> for IntegrityError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_syntax() || err.is_eof() {
            Self::Parse {
                message: err.to_string(),
            }
        } else {
            Self::Serialization {
                format: "JSON".to_string(),
                message: err.to_string(),
            }
        }
    }
}

/// A type alias for `Result<T, IntegrityError>`.
pub type Result<T> = std::result::Result<T, IntegrityError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_errors_become_parse_errors() {
        let err: IntegrityError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(err.is_parse());
    }

    #[test]
    fn test_unrecoverable_message_joins_errors() {
        let err = IntegrityError::unrecoverable(vec!["a".to_string(), "b".to_string()]);
        assert!(err.is_unrecoverable());
        assert_eq!(err.to_string(), "Unrecoverable session data: a; b");
    }
}
