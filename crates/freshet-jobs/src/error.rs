//! Error types for the job engine.

use freshet_core::StoreError;

/// Boxed error returned by a fetch callback.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for job operations.
pub type JobResult<T> = Result<T, JobError>;

/// Errors that can occur while serving a job.
///
/// Lock contention is never an error: a caller that loses the lock race
/// gets the job's empty value.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    /// The cache store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The fetch callback failed.
    #[error("fetch failed for {namespace}: {source}")]
    Fetch {
        namespace: String,
        #[source]
        source: BoxError,
    },

    /// A value could not be encoded for, or decoded from, the store.
    #[error("cannot encode or decode cached value for {namespace}: {source}")]
    Codec {
        namespace: String,
        #[source]
        source: serde_json::Error,
    },
}

impl JobError {
    /// Creates a new fetch error.
    pub fn fetch(namespace: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Fetch {
            namespace: namespace.into(),
            source: source.into(),
        }
    }

    /// Creates a new codec error.
    pub fn codec(namespace: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Codec {
            namespace: namespace.into(),
            source,
        }
    }

    /// Returns the fetch callback's error if it is of type `E`.
    pub fn fetch_error<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            Self::Fetch { source, .. } => source.downcast_ref::<E>(),
            _ => None,
        }
    }

    /// Returns true if this is a transient error that might succeed on retry.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Store(e) => e.is_transient(),
            Self::Fetch { .. } | Self::Codec { .. } => false,
        }
    }
}
