//! Freshet Core - Cache entry, key and error types
//!
//! This crate provides the foundational types shared by the Freshet store,
//! job engine and job implementations.

pub mod entry;
pub mod error;
pub mod key;

pub use entry::{CacheEntry, CachedValue, LockEntry, LockToken};
pub use error::{StoreError, StoreResult};
pub use key::{JobKey, KeyArg, KeyArgs, MAX_KEY_LEN};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_defined() {
        assert!(!version().is_empty());
    }

    #[test]
    fn version_is_semver() {
        let v = version();
        assert_eq!(v.split('.').count(), 3, "Version should be semver");
    }
}
