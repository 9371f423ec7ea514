//! Error types for the catalog crate.

use quizpress_core::QuizId;
use std::fmt;

/// Errors from the quiz document store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached or returned an unexpected response.
    Unavailable { reason: String },
    /// A stored document could not be decoded.
    InvalidDocument { key: String, reason: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable { reason } => {
                write!(f, "quiz store unavailable: {reason}")
            }
            Self::InvalidDocument { key, reason } => {
                write!(f, "invalid quiz document '{key}': {reason}")
            }
        }
    }
}

impl std::error::Error for StoreError {}

/// Errors from catalog operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// No quiz exists for the given ID.
    NotFound { id: QuizId },
    /// The underlying store failed.
    Store { reason: String },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { id } => {
                write!(f, "quiz '{id}' not found")
            }
            Self::Store { reason } => {
                write!(f, "quiz store error: {reason}")
            }
        }
    }
}

impl std::error::Error for CatalogError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display_includes_id() {
        let id = QuizId::new();
        let err = CatalogError::NotFound { id };
        assert!(err.to_string().contains(&id.to_string()));
    }

    #[test]
    fn store_unavailable_display() {
        let err = StoreError::Unavailable {
            reason: "timeout".to_string(),
        };
        assert!(err.to_string().contains("unavailable"));
        assert!(err.to_string().contains("timeout"));
    }
}
