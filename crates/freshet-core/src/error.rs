//! Error types for cache stores.
//!
//! A cache miss is never an error: stores report it as `Ok(None)`. The
//! variants here cover the store itself failing, which callers of the job
//! engine treat as a fatal dependency failure.
//!
//! # Example
//!
//! ```
//! use freshet_core::{StoreError, StoreResult};
//!
//! fn connect(reachable: bool) -> StoreResult<()> {
//!     if !reachable {
//!         return Err(StoreError::unavailable("redis", "connection refused"));
//!     }
//!     Ok(())
//! }
//!
//! let err = connect(false).unwrap_err();
//! assert!(err.is_transient());
//! ```

use thiserror::Error;

/// Result alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors raised by a cache store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached or refused the operation.
    #[error("store '{backend}' unavailable: {reason}")]
    Unavailable {
        /// Backend name (e.g. "memory")
        backend: String,
        /// What went wrong
        reason: String,
    },

    /// A value could not be encoded for, or decoded from, the backend.
    #[error("failed to (de)serialize entry '{key}': {source}")]
    Serialization {
        /// Key of the offending entry
        key: String,
        /// Underlying serde error
        #[source]
        source: serde_json::Error,
    },

    /// The operation did not complete in time.
    #[error("store operation timed out after {millis}ms")]
    Timeout {
        /// Elapsed time before giving up
        millis: u64,
    },

    /// Generic internal error.
    #[error("internal store error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Creates an Unavailable error.
    pub fn unavailable(backend: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            backend: backend.into(),
            reason: reason.into(),
        }
    }

    /// Creates a Serialization error for the given key.
    pub fn serialization(key: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            key: key.into(),
            source,
        }
    }

    /// Creates an Internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns true if retrying the operation later might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::Timeout { .. })
    }
}
