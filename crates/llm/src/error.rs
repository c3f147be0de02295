//! Error types for the language model providers

use std::fmt;

/// Errors that can occur while talking to a language model
#[derive(Debug)]
pub enum LlmError {
    /// The request could not be sent or the server returned an error status
    RequestFailed(String),

    /// The server answered with a payload we could not interpret
    InvalidResponse(String),

    /// Configuration error
    ConfigError(String),
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RequestFailed(msg) => write!(f, "LLM request failed: {msg}"),
            Self::InvalidResponse(msg) => write!(f, "Invalid LLM response: {msg}"),
            Self::ConfigError(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl std::error::Error for LlmError {}

impl From<LlmError> for review_eval_core::Error {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::ConfigError(msg) => review_eval_core::Error::config(msg),
            other => review_eval_core::Error::provider(other.to_string()),
        }
    }
}
