//! Job and scheduler metrics recording.

use metrics::{counter, histogram};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Describes the job and scheduler metrics.
/// Call once at startup, after installing a recorder.
pub fn register_job_metrics() {
    metrics::describe_counter!(
        "freshet_job_fetches_total",
        "Total number of fetch callback invocations"
    );
    metrics::describe_counter!(
        "freshet_job_fetch_errors_total",
        "Total number of failed fetch callback invocations"
    );
    metrics::describe_counter!(
        "freshet_job_lock_contention_total",
        "Refreshes skipped because another worker held the lock"
    );
    metrics::describe_counter!(
        "freshet_job_deferred_total",
        "Total number of refreshes handed to the scheduler"
    );
    metrics::describe_histogram!(
        "freshet_job_fetch_seconds",
        "Time spent in fetch callbacks"
    );
    metrics::describe_counter!(
        "freshet_refresh_dropped_total",
        "Deferred refreshes dropped because the queue was full or closed"
    );
    metrics::describe_counter!(
        "freshet_refresh_failed_total",
        "Deferred refreshes that ended in an error"
    );
}

/// Per-job metrics recorder, labeled with the job namespace.
#[derive(Debug, Clone)]
pub struct JobMetrics {
    namespace: String,
    fetches: Arc<AtomicU64>,
    errors: Arc<AtomicU64>,
    contended: Arc<AtomicU64>,
    deferred: Arc<AtomicU64>,
}

impl JobMetrics {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            fetches: Arc::new(AtomicU64::new(0)),
            errors: Arc::new(AtomicU64::new(0)),
            contended: Arc::new(AtomicU64::new(0)),
            deferred: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Records a completed fetch and its duration.
    pub fn record_fetch(&self, duration: Duration) {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        counter!("freshet_job_fetches_total", "namespace" => self.namespace.clone()).increment(1);
        histogram!("freshet_job_fetch_seconds", "namespace" => self.namespace.clone())
            .record(duration.as_secs_f64());
    }

    /// Records a failed fetch.
    pub fn record_fetch_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
        counter!("freshet_job_fetch_errors_total", "namespace" => self.namespace.clone())
            .increment(1);
    }

    /// Records a refresh skipped because the lock was held.
    pub fn record_contention(&self) {
        self.contended.fetch_add(1, Ordering::Relaxed);
        counter!("freshet_job_lock_contention_total", "namespace" => self.namespace.clone())
            .increment(1);
    }

    /// Records a refresh handed to the scheduler.
    pub fn record_deferred(&self) {
        self.deferred.fetch_add(1, Ordering::Relaxed);
        counter!("freshet_job_deferred_total", "namespace" => self.namespace.clone())
            .increment(1);
    }

    /// Number of fetch callback invocations, failed ones included.
    pub fn fetches(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed) + self.errors.load(Ordering::Relaxed)
    }

    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    pub fn contended(&self) -> u64 {
        self.contended.load(Ordering::Relaxed)
    }

    pub fn deferred(&self) -> u64 {
        self.deferred.load(Ordering::Relaxed)
    }
}

/// Records a deferred refresh dropped by the scheduler.
pub(crate) fn record_refresh_dropped(namespace: &str, reason: &'static str) {
    counter!(
        "freshet_refresh_dropped_total",
        "namespace" => namespace.to_string(),
        "reason" => reason
    )
    .increment(1);
}

/// Records a deferred refresh that failed.
pub(crate) fn record_refresh_failed(namespace: &str) {
    counter!("freshet_refresh_failed_total", "namespace" => namespace.to_string()).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_metrics_counts() {
        let metrics = JobMetrics::new("wiki.document_tags");

        metrics.record_fetch(Duration::from_millis(3));
        metrics.record_fetch(Duration::from_millis(5));
        metrics.record_fetch_error();
        metrics.record_contention();
        metrics.record_deferred();

        assert_eq!(metrics.fetches(), 3);
        assert_eq!(metrics.errors(), 1);
        assert_eq!(metrics.contended(), 1);
        assert_eq!(metrics.deferred(), 1);
    }

    #[test]
    fn test_clones_share_counters() {
        let metrics = JobMetrics::new("ns");
        metrics.clone().record_deferred();
        assert_eq!(metrics.deferred(), 1);
    }
}
