//! Store configuration and backend selection.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::memory::MemoryStore;
use crate::noop::NoopStore;
use crate::traits::CacheStore;

/// Which backend to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local Moka store.
    #[default]
    Memory,
    /// Caching disabled.
    Noop,
}

/// Store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Backend to use (default: memory)
    pub backend: StoreBackend,
    /// Maximum number of entries (default: 100000)
    pub max_capacity: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            max_capacity: 100_000,
        }
    }
}

impl StoreConfig {
    /// Sets the backend.
    pub fn with_backend(mut self, backend: StoreBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Sets the maximum number of entries.
    pub fn with_max_capacity(mut self, max_capacity: u64) -> Self {
        self.max_capacity = max_capacity;
        self
    }
}

/// Builds the store described by `config`.
pub fn build_store(config: &StoreConfig) -> Arc<dyn CacheStore> {
    info!(
        backend = ?config.backend,
        max_capacity = config.max_capacity,
        "Building cache store"
    );

    match config.backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new(config.clone())),
        StoreBackend::Noop => Arc::new(NoopStore::new()),
    }
}
