//! In-memory store using Moka.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use freshet_core::{CacheEntry, LockEntry, LockToken, StoreResult};
use moka::Expiry;
use moka::future::Cache;
use moka::notification::RemovalCause;
use parking_lot::Mutex;
use tracing::debug;

use crate::config::StoreConfig;
use crate::metrics::StoreMetrics;
use crate::traits::CacheStore;

/// Expired locks are swept once the table grows past this size.
const LOCK_SWEEP_THRESHOLD: usize = 1_024;

#[derive(Debug)]
struct Stored {
    entry: CacheEntry,
    ttl: Duration,
}

/// Per-entry TTL taken from the `ttl` passed to `set`.
struct EntryTtl;

impl Expiry<String, Arc<Stored>> for EntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &Arc<Stored>,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Arc<Stored>,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Process-local store.
/// Thread-safe and async-friendly; clones share the same data.
///
/// Entries live in a Moka cache with a TTL per entry. Refresh locks live in
/// a separate table guarded by a mutex, which makes acquisition atomic.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use freshet_store::{CacheStore, MemoryStore, StoreConfig};
///
/// # #[tokio::main]
/// # async fn main() {
/// let store = MemoryStore::new(StoreConfig::default());
///
/// if store.get("wiki:v1:u7").await.unwrap().is_none() {
///     println!("Cache miss!");
/// }
/// # }
/// ```
#[derive(Clone)]
pub struct MemoryStore {
    entries: Cache<String, Arc<Stored>>,
    locks: Arc<Mutex<HashMap<String, LockEntry>>>,
    next_token: Arc<AtomicU64>,
    metrics: StoreMetrics,
}

impl MemoryStore {
    /// Creates a new store with the given configuration.
    pub fn new(config: StoreConfig) -> Self {
        let metrics = StoreMetrics::new();

        let eviction_metrics = metrics.clone();
        let entries = Cache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(EntryTtl)
            .eviction_listener(move |_key, _value, cause| {
                let reason = match cause {
                    RemovalCause::Expired => "ttl",
                    RemovalCause::Size => "capacity",
                    RemovalCause::Explicit => "manual",
                    // Overwritten by a refresh, not removed
                    RemovalCause::Replaced => return,
                };
                eviction_metrics.record_eviction(reason);
            })
            .build();

        Self {
            entries,
            locks: Arc::new(Mutex::new(HashMap::new())),
            next_token: Arc::new(AtomicU64::new(1)),
            metrics,
        }
    }

    /// Approximate number of entries.
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }

    /// Number of live (unexpired) locks.
    pub fn live_lock_count(&self) -> usize {
        let now = Instant::now();
        self.locks
            .lock()
            .values()
            .filter(|lock| !lock.is_expired_at(now))
            .count()
    }

    /// Returns the metrics for external access.
    pub fn metrics(&self) -> &StoreMetrics {
        &self.metrics
    }

    /// Runs Moka's pending maintenance (expiry, eviction notifications).
    pub async fn sync(&self) {
        self.entries.run_pending_tasks().await;
        self.metrics.update_entry_count(self.entries.entry_count());
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get(&self, key: &str) -> StoreResult<Option<CacheEntry>> {
        let start = Instant::now();
        let found = self.entries.get(key).await.map(|stored| stored.entry.clone());

        if found.is_some() {
            self.metrics.record_hit();
        } else {
            self.metrics.record_miss();
        }
        self.metrics.record_operation_duration("get", start.elapsed());

        Ok(found)
    }

    async fn set(&self, key: &str, entry: CacheEntry, ttl: Duration) -> StoreResult<()> {
        if ttl.is_zero() {
            debug!(key = %key, "Skipping store of entry with zero TTL");
            return Ok(());
        }

        let start = Instant::now();
        self.entries
            .insert(key.to_string(), Arc::new(Stored { entry, ttl }))
            .await;

        self.metrics.record_operation_duration("set", start.elapsed());
        self.metrics.update_entry_count(self.entries.entry_count());

        Ok(())
    }

    async fn try_acquire_lock(
        &self,
        key: &str,
        timeout: Duration,
    ) -> StoreResult<Option<LockToken>> {
        let now = Instant::now();
        let mut locks = self.locks.lock();

        if let Some(existing) = locks.get(key) {
            if !existing.is_expired_at(now) {
                self.metrics.record_contention();
                return Ok(None);
            }
            debug!(
                key = %key,
                held_for = ?now.saturating_duration_since(existing.acquired_at),
                "Reclaiming abandoned refresh lock"
            );
        }

        let token = LockToken::new(self.next_token.fetch_add(1, Ordering::Relaxed));
        locks.insert(key.to_string(), LockEntry::acquire(key, timeout, token));

        if locks.len() > LOCK_SWEEP_THRESHOLD {
            locks.retain(|_, lock| !lock.is_expired_at(now));
        }

        Ok(Some(token))
    }

    async fn release_lock(&self, key: &str, token: LockToken) -> StoreResult<()> {
        let mut locks = self.locks.lock();

        match locks.get(key).map(|lock| lock.is_held_by(token)) {
            Some(true) => {
                locks.remove(key);
            },
            Some(false) => {
                debug!(key = %key, "Refresh lock was taken over, leaving it in place");
            },
            None => {},
        }
        Ok(())
    }
}
