//! Custom error types for costsplit
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for costsplit operations
#[derive(Error, Debug)]
pub enum CostsplitError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// YAML serialization errors
    #[error("YAML error: {0}")]
    Yaml(String),

    /// Validation errors: invalid category, amount out of range,
    /// sum or percentage mismatch beyond tolerance
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors (registry-level)
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// Capability check failed for the requesting identity
    #[error("Forbidden: cannot {action} {identifier}")]
    Forbidden {
        action: &'static str,
        identifier: String,
    },

    /// Operation incompatible with the current segment-set or lifecycle state
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Store-level failure the caller may retry (lock poisoning, I/O during
    /// persist). Never retried internally.
    #[error("Transient storage error: {0}")]
    Transient(String),

    /// Import errors
    #[error("Import error: {0}")]
    Import(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),
}

impl CostsplitError {
    /// Create a "not found" error for expenses
    pub fn expense_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Expense",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for segments
    pub fn segment_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Segment",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for categories
    pub fn category_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Category",
            identifier: identifier.into(),
        }
    }

    /// Create a "forbidden" error for a denied action
    pub fn forbidden(action: &'static str, identifier: impl Into<String>) -> Self {
        Self::Forbidden {
            action,
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a forbidden error
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden { .. })
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Check if this is a transient error the caller may retry
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for CostsplitError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for CostsplitError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<serde_yaml::Error> for CostsplitError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Yaml(err.to_string())
    }
}

impl From<csv::Error> for CostsplitError {
    fn from(err: csv::Error) -> Self {
        Self::Import(err.to_string())
    }
}

/// Result type alias for costsplit operations
pub type CostsplitResult<T> = Result<T, CostsplitError>;
