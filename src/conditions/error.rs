//! error types for the condition engine
//!
//! configuration errors are raised while building trees and never deferred to
//! evaluation. evaluation errors only cover value shapes a comparer cannot
//! handle; a missing fact is not an error.

use thiserror::Error;

/// mistakes in a condition definition, detected at construction time
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("unknown condition type '{tag}'{}", suggestion_hint(.suggestions))]
    UnknownType {
        tag: String,
        suggestions: Vec<String>,
    },

    #[error("unknown relation '{0}' (expected AND or OR)")]
    UnknownRelation(String),

    #[error("unknown comparison operator '{0}'")]
    UnknownOperator(String),

    #[error("invalid regex pattern '{pattern}': {message}")]
    InvalidRegex { pattern: String, message: String },

    #[error("condition type '{tag}' is already registered as '{existing}'")]
    DuplicateType { tag: String, existing: String },

    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error("{0}")]
    Malformed(String),

    #[error("unknown custom comparer '{0}'")]
    UnknownCustom(String),

    #[error("{0} cannot be converted back to a specification")]
    NotSerializable(String),
}

impl ConfigError {
    /// close matches offered for an unknown condition type
    pub fn suggestions(&self) -> &[String] {
        match self {
            ConfigError::UnknownType { suggestions, .. } => suggestions,
            _ => &[],
        }
    }
}

fn suggestion_hint(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (did you mean: {}?)", suggestions.join(", "))
    }
}

/// a configuration error located inside a specification
#[derive(Debug, Clone, PartialEq)]
pub struct TranslateError {
    /// location of the failing node, e.g. `items[0].items[1]`
    pub path: String,
    pub kind: ConfigError,
}

impl TranslateError {
    pub fn new(kind: ConfigError, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

impl std::fmt::Display for TranslateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.path, self.kind)
        }
    }
}

impl std::error::Error for TranslateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

/// a comparison that could not be decided
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("{comparer} comparer cannot handle actual value {actual}")]
    TypeMismatch {
        comparer: &'static str,
        actual: String,
    },
}
