//! Error types and result aliases for depsort operations.
//!
//! The sorting engine never fails on malformed items: inconsistencies are
//! accumulated on the result. These errors cover contract violations and
//! the outer surfaces (manifests, configuration, the command line).

use thiserror::Error;

/// Unified error type for all depsort operations
#[derive(Error, Debug)]
pub enum DepSortError {
    #[error("Invalid item name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    // Manifest errors
    #[error("Failed to parse manifest: {message}")]
    TomlParse { message: String },

    #[error("Failed to parse JSON manifest: {message}")]
    JsonParse { message: String },

    #[error("Configuration field '{field}' is invalid: {reason}")]
    ConfigValidation { field: String, reason: String },

    #[error("Failed to serialize {what}: {message}")]
    Serialization { what: String, message: String },

    // Ordering errors
    #[error("Circular dependency detected: {cycle}")]
    CircularDependency { cycle: String },

    #[error("Dependency ordering is incomplete: {reason}")]
    Incomplete { reason: String },

    // IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for depsort operations
pub type DepSortResult<T> = Result<T, DepSortError>;

impl DepSortError {
    /// Create an IO error from std::io::Error
    pub fn io(message: String, source: std::io::Error) -> Self {
        Self::Io { message, source }
    }

    /// Create a configuration validation error
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a serialization error for `what` (a manifest, a report)
    pub fn serialization(what: impl Into<String>, message: impl ToString) -> Self {
        Self::Serialization {
            what: what.into(),
            message: message.to_string(),
        }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(self, DepSortError::Io { .. })
    }

    /// Get a user-friendly suggestion for fixing this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            DepSortError::InvalidName { .. } => {
                Some("Item names must be non-empty; a leading '?' only marks a reference as optional")
            },
            DepSortError::CircularDependency { .. } => {
                Some("Break the cycle by removing one of the relations listed in the explanation")
            },
            DepSortError::Incomplete { .. } => {
                Some("Run 'depsort check' to list the issues found on each item")
            },
            DepSortError::TomlParse { .. } | DepSortError::JsonParse { .. } => {
                Some("Every item needs at least a 'name'; see the [[item]] tables of the manifest")
            },
            _ => None,
        }
    }
}
