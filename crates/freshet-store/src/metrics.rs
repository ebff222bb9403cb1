//! Store metrics recording.

use metrics::{counter, gauge, histogram};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Describes the store metrics.
/// Call once at startup, after installing a recorder.
pub fn register_store_metrics() {
    metrics::describe_counter!("freshet_store_hits_total", "Total number of store hits");
    metrics::describe_counter!("freshet_store_misses_total", "Total number of store misses");
    metrics::describe_counter!(
        "freshet_store_evictions_total",
        "Total number of store evictions"
    );
    metrics::describe_counter!(
        "freshet_store_lock_contention_total",
        "Lock acquisitions refused because another worker holds the lock"
    );
    metrics::describe_gauge!("freshet_store_entries", "Current number of entries in the store");
    metrics::describe_histogram!(
        "freshet_store_operation_seconds",
        "Time spent on store operations"
    );
}

/// Store metrics recorder.
///
/// Keeps local atomic counters next to the global `metrics` facade so hit
/// rates can be read back without a recorder installed.
#[derive(Debug, Clone)]
pub struct StoreMetrics {
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
    contended: Arc<AtomicU64>,
    evictions: Arc<AtomicU64>,
}

impl StoreMetrics {
    pub fn new() -> Self {
        Self {
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
            contended: Arc::new(AtomicU64::new(0)),
            evictions: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Records a hit.
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        counter!("freshet_store_hits_total").increment(1);
    }

    /// Records a miss.
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        counter!("freshet_store_misses_total").increment(1);
    }

    /// Records a refused lock acquisition.
    pub fn record_contention(&self) {
        self.contended.fetch_add(1, Ordering::Relaxed);
        counter!("freshet_store_lock_contention_total").increment(1);
    }

    /// Records an eviction.
    pub fn record_eviction(&self, reason: &str) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
        counter!("freshet_store_evictions_total", "reason" => reason.to_string()).increment(1);
    }

    /// Updates the entry gauge.
    pub fn update_entry_count(&self, count: u64) {
        gauge!("freshet_store_entries").set(count as f64);
    }

    /// Records the duration of an operation.
    pub fn record_operation_duration(&self, operation: &'static str, duration: Duration) {
        histogram!("freshet_store_operation_seconds", "operation" => operation)
            .record(duration.as_secs_f64());
    }

    /// Hit rate (for logging/debugging).
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed) as f64;
        let misses = self.misses.load(Ordering::Relaxed) as f64;
        let total = hits + misses;
        if total == 0.0 { 0.0 } else { hits / total }
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn contended(&self) -> u64 {
        self.contended.load(Ordering::Relaxed)
    }

    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }
}

impl Default for StoreMetrics {
    fn default() -> Self {
        Self::new()
    }
}
