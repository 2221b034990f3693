//! Error types for PolicyQA.
//!
//! This module defines a unified error enum covering configuration, I/O,
//! model, prompt and validation failures.

use thiserror::Error;

/// Unified error type for PolicyQA.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// LLM provider errors (transport, status, provider setup)
    #[error("LLM error: {0}")]
    Llm(String),

    /// The model call failed or returned no usable structured output
    #[error("Upstream generation failure: {0}")]
    Generation(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Caller input rejected before any model call
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_display() {
        let err = AppError::Generation("no structured output".to_string());
        assert_eq!(
            err.to_string(),
            "Upstream generation failure: no structured output"
        );
    }
}
