use std::fmt;
use thiserror::Error;

/// Result type for review-eval operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for review-eval operations
#[derive(Error, Debug)]
pub enum Error {
    /// A comment or analysis referenced a file that is not part of the patch
    #[error("File not in patch: {file}")]
    FileNotInPatch { file: String },

    /// The patch is larger than the generation tool accepts
    #[error("Diff {patch_id} is too large: {size} bytes exceeds the {limit} byte limit")]
    LargeDiff {
        patch_id: String,
        size: usize,
        limit: usize,
    },

    /// Model output could not be turned into structured comments
    #[error("Parse failure: {0}")]
    ParseFailure(String),

    /// A required input artifact does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Refused to persist a checkpoint with no records
    #[error("Refusing to save an empty checkpoint: no review requests produced suggestions")]
    EmptyCheckpoint,

    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization errors for checkpoints and model payloads
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Errors reading or writing tabular result files
    #[error("CSV error: {0}")]
    Csv(String),

    /// Errors returned by an external collaborator (model, patch store, ...)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Any other error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Conditions that exclude a review request (or one variant of it) from the
/// results without aborting the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    FileNotInPatch,
    LargeDiff,
    ParseFailure,
    NoSuggestions,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileNotInPatch => write!(f, "file not in patch"),
            Self::LargeDiff => write!(f, "diff too large"),
            Self::ParseFailure => write!(f, "unparseable model output"),
            Self::NoSuggestions => write!(f, "no suggestions"),
        }
    }
}

impl Error {
    /// Creates a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a file-not-in-patch error
    pub fn file_not_in_patch(file: impl Into<String>) -> Self {
        Self::FileNotInPatch { file: file.into() }
    }

    /// Creates a parse failure
    pub fn parse_failure(msg: impl Into<String>) -> Self {
        Self::ParseFailure(msg.into())
    }

    /// Creates a not-found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Creates a CSV error
    pub fn csv(msg: impl Into<String>) -> Self {
        Self::Csv(msg.into())
    }

    /// Creates a provider error
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    /// Creates an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Adds context to any error
    pub fn with_context<E>(context: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::WithContext {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Classifies the error as a recoverable skip condition.
    ///
    /// Returns `None` for errors that must abort the run.
    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            Self::FileNotInPatch { .. } => Some(SkipReason::FileNotInPatch),
            Self::LargeDiff { .. } => Some(SkipReason::LargeDiff),
            Self::ParseFailure(_) => Some(SkipReason::ParseFailure),
            Self::NotFound(_)
            | Self::EmptyCheckpoint
            | Self::Io(_)
            | Self::Config(_)
            | Self::Serialization(_)
            | Self::Csv(_)
            | Self::Provider(_)
            | Self::InvalidInput(_)
            | Self::WithContext { .. }
            | Self::Other(_) => None,
        }
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::with_context(context, e))
    }
}
