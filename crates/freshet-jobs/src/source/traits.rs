//! Fetch trait definition.

use async_trait::async_trait;
use freshet_core::KeyArgs;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Computes the value of a job for a set of arguments.
///
/// Fetches must be free of side effects: the engine may call them from any
/// worker and retries them on every refresh. Returning `Ok(None)` means
/// "computed, found nothing"; the engine caches that as the empty sentinel.
///
/// # Example
///
/// ```ignore
/// use freshet_jobs::Fetch;
///
/// struct TagCount;
///
/// #[async_trait]
/// impl Fetch for TagCount {
///     type Args = u64;
///     type Output = usize;
///     type Error = std::io::Error;
///
///     async fn fetch(&self, document: &u64) -> Result<Option<usize>, Self::Error> {
///         // Implementation here
///     }
/// }
/// ```
#[async_trait]
pub trait Fetch: Send + Sync + 'static {
    /// Positional arguments; they become the cache key.
    type Args: KeyArgs + Clone + Send + Sync + 'static;

    /// The computed value.
    type Output: Serialize + DeserializeOwned + Clone + Send + Sync + 'static;

    /// Error returned when the value cannot be computed.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Computes the value for `args`.
    async fn fetch(&self, args: &Self::Args) -> Result<Option<Self::Output>, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Lengths {
        words: HashMap<u64, String>,
    }

    #[async_trait]
    impl Fetch for Lengths {
        type Args = u64;
        type Output = usize;
        type Error = std::io::Error;

        async fn fetch(&self, id: &u64) -> Result<Option<usize>, std::io::Error> {
            Ok(self.words.get(id).map(String::len))
        }
    }

    #[tokio::test]
    async fn test_fetch_found_and_missing() {
        let fetcher = Lengths {
            words: HashMap::from([(1, "zone".to_string())]),
        };

        assert_eq!(fetcher.fetch(&1).await.unwrap(), Some(4));
        assert_eq!(fetcher.fetch(&2).await.unwrap(), None);
    }
}
