//! Error types for raglens.

use thiserror::Error;

/// Result type alias using raglens's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for raglens operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Requested evaluator provider is not registered
    #[error("Unsupported Evaluator provider: '{provider}'. Available: {}", .available.join(", "))]
    UnknownProvider {
        provider: String,
        available: Vec<String>,
    },

    /// Requested metrics are outside the evaluator's supported set
    #[error("Unsupported custom metrics: {}. Supported: {}", .metrics.join(", "), .supported.join(", "))]
    UnsupportedMetric {
        metrics: Vec<String>,
        supported: Vec<String>,
    },

    /// Evaluator input failed validation
    #[error("{message}")]
    Validation { field: String, message: String },

    /// Test set file missing or malformed
    #[error("Test set load error: {0}")]
    TestSetLoad(String),

    /// Retrieval collaborator failed
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// Answer generation failed
    #[error("Generation error: {0}")]
    Generation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification used to decide how far an error propagates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Fix the configuration and retry the whole run.
    Configuration,
    /// Test set could not be loaded; the run never started.
    Load,
    /// Bad input for a single query.
    Validation,
    /// A collaborator could not serve the request.
    Unavailable,
    /// Anything else.
    Internal,
}

impl Error {
    /// Build a validation error for the named argument.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnknownProvider { .. } | Error::UnsupportedMetric { .. } | Error::Config(_) => {
                ErrorKind::Configuration
            }
            Error::TestSetLoad(_) => ErrorKind::Load,
            Error::Validation { .. } => ErrorKind::Validation,
            Error::Retrieval(_) | Error::Generation(_) | Error::Request(_) => {
                ErrorKind::Unavailable
            }
            Error::Serialization(_) | Error::Io(_) => ErrorKind::Internal,
        }
    }

    /// Whether this error must abort the caller's run.
    pub fn is_fatal(&self) -> bool {
        matches!(self.kind(), ErrorKind::Configuration | ErrorKind::Load)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}
