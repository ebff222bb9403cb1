//! Error types for wiki data sources.

use std::path::PathBuf;

use crate::model::DocumentId;

/// Result type alias for wiki operations.
pub type WikiResult<T> = Result<T, WikiError>;

/// Errors that can occur when reading wiki data.
#[derive(Debug, thiserror::Error)]
pub enum WikiError {
    /// The requested document does not exist.
    #[error("document not found: {0}")]
    DocumentNotFound(DocumentId),

    /// The data source is not available.
    #[error("source unavailable: {reason}")]
    SourceUnavailable { reason: String },

    /// A fixture file could not be parsed.
    #[error("invalid fixture {path}: {reason}")]
    Fixture { path: PathBuf, reason: String },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WikiError {
    /// Creates a new source unavailable error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            reason: reason.into(),
        }
    }

    /// Creates a new fixture error.
    pub fn fixture(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Fixture {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if this is a transient error that might succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::SourceUnavailable { .. })
    }
}
