use review_eval_core::Error as CoreError;
use thiserror::Error;

/// Adapter-specific error types
#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("Request to {url} failed: {message}")]
    RequestFailed { url: String, message: String },

    #[error("{url} returned {status}: {body}")]
    BadStatus {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Invalid response from {url}: {message}")]
    InvalidResponse { url: String, message: String },

    #[error("Dataset error at record {record}: {message}")]
    Dataset { record: u64, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<AdapterError> for CoreError {
    fn from(err: AdapterError) -> Self {
        match err {
            AdapterError::Dataset { .. } => CoreError::csv(err.to_string()),
            AdapterError::InvalidConfig(msg) => CoreError::config(msg),
            other => CoreError::provider(other.to_string()),
        }
    }
}
