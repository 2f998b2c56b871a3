//! Error types for context window operations.
//!
//! Token counting never fails (it degrades to an estimate instead), so the
//! only errors here are caller contract violations and settings loading.

use thiserror::Error;

/// Result type for context window operations.
pub type Result<T> = std::result::Result<T, ContextError>;

/// Errors that can occur in context window operations.
#[derive(Debug, Error)]
pub enum ContextError {
    /// Token budget is not a positive integer.
    #[error("Invalid token budget: {max_tokens} (must be greater than zero)")]
    InvalidBudget { max_tokens: usize },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ContextError {
    fn from(err: serde_json::Error) -> Self {
        ContextError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for ContextError {
    fn from(err: serde_yaml::Error) -> Self {
        ContextError::Serialization(err.to_string())
    }
}
