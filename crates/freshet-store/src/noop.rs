//! No-operation store.
//!
//! Stores nothing and grants every lock, so each job call fetches. Useful
//! when caching is disabled or for benchmarking without cache effects.

use std::time::Duration;

use async_trait::async_trait;
use freshet_core::{CacheEntry, LockToken, StoreResult};

use crate::traits::CacheStore;

/// A store that doesn't store anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStore;

impl NoopStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CacheStore for NoopStore {
    fn name(&self) -> &str {
        "noop"
    }

    async fn get(&self, _key: &str) -> StoreResult<Option<CacheEntry>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _entry: CacheEntry, _ttl: Duration) -> StoreResult<()> {
        Ok(())
    }

    async fn try_acquire_lock(
        &self,
        _key: &str,
        _timeout: Duration,
    ) -> StoreResult<Option<LockToken>> {
        Ok(Some(LockToken::new(0)))
    }

    async fn release_lock(&self, _key: &str, _token: LockToken) -> StoreResult<()> {
        Ok(())
    }
}
