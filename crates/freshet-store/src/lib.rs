//! # Freshet Store
//!
//! Expiry-capable key/value stores with atomic refresh locks.
//!
//! The job engine talks to a store only through [`CacheStore`]. This crate
//! ships two backends:
//!
//! - [`MemoryStore`] - Moka-backed store with per-entry TTLs and a lock table
//! - [`NoopStore`] - stores nothing, for running with caching disabled
//!
//! ## Example
//!
//! ```no_run
//! use std::time::Duration;
//! use freshet_core::{CacheEntry, CachedValue};
//! use freshet_store::{CacheStore, MemoryStore, StoreConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), freshet_core::StoreError> {
//! let store = MemoryStore::new(StoreConfig::default());
//!
//! if let Some(token) = store.try_acquire_lock("wiki:v1:u7", Duration::from_secs(30)).await? {
//!     let entry = CacheEntry::fresh_for(CachedValue::Empty, Duration::from_secs(600));
//!     store.set("wiki:v1:u7", entry, Duration::from_secs(600)).await?;
//!     store.release_lock("wiki:v1:u7", token).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod memory;
pub mod metrics;
pub mod noop;
pub mod traits;

// Re-exports
pub use config::{StoreBackend, StoreConfig, build_store};
pub use memory::MemoryStore;
pub use metrics::{StoreMetrics, register_store_metrics};
pub use noop::NoopStore;
pub use traits::CacheStore;
