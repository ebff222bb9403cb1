//! Cache store trait definition.

use std::time::Duration;

use async_trait::async_trait;
use freshet_core::{CacheEntry, LockToken, StoreResult};

/// An expiry-capable key/value store with per-key refresh locks.
///
/// This trait abstracts over different backends (in-memory, memcached,
/// Redis, ...). The job engine coordinates concurrent workers exclusively
/// through it, so the lock primitives must be atomic across every process
/// sharing the backend.
///
/// # Implementors
///
/// - `MemoryStore` - Moka-backed, process local
/// - `NoopStore` - caching disabled
///
/// # Example
///
/// ```ignore
/// use freshet_store::CacheStore;
///
/// struct MyStore;
///
/// #[async_trait]
/// impl CacheStore for MyStore {
///     fn name(&self) -> &str {
///         "my-store"
///     }
///
///     async fn get(&self, key: &str) -> StoreResult<Option<CacheEntry>> {
///         // Implementation here
///     }
///
///     // ...
/// }
/// ```
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the name of this backend, for logging.
    fn name(&self) -> &str;

    /// Looks up an entry.
    ///
    /// A missing or expired entry is `Ok(None)`, never an error. An entry
    /// holding the empty sentinel is `Ok(Some(..))`.
    async fn get(&self, key: &str) -> StoreResult<Option<CacheEntry>>;

    /// Stores an entry, replacing any previous one.
    ///
    /// The backend evicts the entry once `ttl` has elapsed. A zero `ttl`
    /// stores nothing.
    async fn set(&self, key: &str, entry: CacheEntry, ttl: Duration) -> StoreResult<()>;

    /// Tries to take the refresh lock for `key`.
    ///
    /// Returns a token for exactly one caller while the lock is live, `None`
    /// for everyone else. A lock older than its `timeout` counts as absent
    /// and can be taken again.
    async fn try_acquire_lock(&self, key: &str, timeout: Duration)
    -> StoreResult<Option<LockToken>>;

    /// Releases the refresh lock for `key` if `token` still holds it.
    ///
    /// A lock that expired and was taken over by another caller is left in
    /// place. Releasing a free lock is a no-op.
    async fn release_lock(&self, key: &str, token: LockToken) -> StoreResult<()>;
}
