//! Background refresh scheduler.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{Semaphore, mpsc, watch};
use tracing::{debug, info, warn};

use super::{SchedulerState, SchedulerStats};
use crate::error::JobResult;
use crate::metrics::{record_refresh_dropped, record_refresh_failed};

/// The work of one deferred refresh.
pub type RefreshFuture = Pin<Box<dyn Future<Output = JobResult<()>> + Send + 'static>>;

/// Configuration for the refresh scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Maximum number of queued requests.
    pub queue_capacity: usize,
    /// Maximum number of refreshes running at once.
    pub max_concurrency: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
            max_concurrency: 8,
        }
    }
}

/// A deferred refresh of one job invocation.
pub struct RefreshRequest {
    namespace: String,
    args: String,
    task: RefreshFuture,
}

impl RefreshRequest {
    /// Creates a request. `args` is only used for logging.
    pub fn new(
        namespace: impl Into<String>,
        args: impl Into<String>,
        task: impl Future<Output = JobResult<()>> + Send + 'static,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            args: args.into(),
            task: Box::pin(task),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn args(&self) -> &str {
        &self.args
    }
}

impl fmt::Debug for RefreshRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshRequest")
            .field("namespace", &self.namespace)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

/// Handle for controlling a running refresh scheduler.
pub struct RefreshHandle {
    /// Sender to signal shutdown.
    shutdown_tx: watch::Sender<bool>,
}

impl RefreshHandle {
    /// Signals the scheduler to stop. Queued requests are discarded.
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Runs deferred refreshes in the background.
///
/// Delivery is best-effort: `schedule` never blocks, and a request is
/// dropped when the queue is full or the scheduler has stopped. Requests
/// still queued when the process exits are lost.
#[derive(Clone)]
pub struct RefreshScheduler {
    tx: mpsc::Sender<RefreshRequest>,
    state: Arc<SchedulerState>,
}

impl RefreshScheduler {
    /// Starts the dispatcher on the current tokio runtime.
    ///
    /// Returns the scheduler and a handle that stops it.
    pub fn start(config: SchedulerConfig) -> (Self, RefreshHandle) {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let state = Arc::new(SchedulerState::new());

        let dispatcher = Dispatcher {
            rx,
            shutdown_rx,
            permits: Arc::new(Semaphore::new(config.max_concurrency.max(1))),
            state: Arc::clone(&state),
        };
        tokio::spawn(dispatcher.run(config));

        (Self { tx, state }, RefreshHandle { shutdown_tx })
    }

    /// Enqueues a request without waiting.
    ///
    /// Returns false if the request was dropped.
    pub fn schedule(&self, request: RefreshRequest) -> bool {
        self.state.record_enqueued();

        let (request, reason) = match self.tx.try_send(request) {
            Ok(()) => return true,
            Err(TrySendError::Full(request)) => (request, "full"),
            Err(TrySendError::Closed(request)) => (request, "closed"),
        };

        self.state.record_abandoned(1);
        record_refresh_dropped(request.namespace(), reason);
        warn!(
            namespace = %request.namespace(),
            args = %request.args(),
            reason,
            "Dropping deferred refresh"
        );
        false
    }

    /// Returns a snapshot of the scheduler counters.
    pub fn stats(&self) -> SchedulerStats {
        self.state.stats()
    }

    /// Returns the scheduler state.
    pub fn state(&self) -> &Arc<SchedulerState> {
        &self.state
    }

    /// Waits until every accepted request has finished.
    pub async fn idle(&self) {
        self.state.wait_idle().await;
    }
}

struct Dispatcher {
    rx: mpsc::Receiver<RefreshRequest>,
    shutdown_rx: watch::Receiver<bool>,
    permits: Arc<Semaphore>,
    state: Arc<SchedulerState>,
}

impl Dispatcher {
    /// Runs the dispatcher loop.
    async fn run(mut self, config: SchedulerConfig) {
        info!(
            queue_capacity = config.queue_capacity,
            max_concurrency = config.max_concurrency,
            "Starting refresh scheduler"
        );

        loop {
            tokio::select! {
                request = self.rx.recv() => {
                    let Some(request) = request else {
                        debug!("All schedulers dropped, refresh dispatcher exiting");
                        break;
                    };
                    let Ok(permit) = Arc::clone(&self.permits).acquire_owned().await else {
                        break;
                    };
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        execute(request, &state).await;
                        drop(permit);
                    });
                }
                result = self.shutdown_rx.changed() => {
                    if result.is_err() || *self.shutdown_rx.borrow() {
                        info!("Refresh scheduler shutting down");
                        break;
                    }
                }
            }
        }

        self.rx.close();
        let mut abandoned = 0;
        while self.rx.try_recv().is_ok() {
            abandoned += 1;
        }
        if abandoned > 0 {
            warn!(abandoned, "Discarding queued refreshes at shutdown");
            self.state.record_abandoned(abandoned);
        }
    }
}

/// Runs one request, recording its outcome. A panicking refresh counts as
/// failed.
async fn execute(request: RefreshRequest, state: &SchedulerState) {
    let RefreshRequest {
        namespace,
        args,
        task,
    } = request;

    match tokio::spawn(task).await {
        Ok(Ok(())) => {
            debug!(namespace = %namespace, args = %args, "Deferred refresh completed");
            state.record_success();
        },
        Ok(Err(e)) => {
            warn!(namespace = %namespace, args = %args, error = %e, "Deferred refresh failed");
            record_refresh_failed(&namespace);
            state.record_failure(e.to_string());
        },
        Err(e) => {
            warn!(namespace = %namespace, args = %args, error = %e, "Deferred refresh panicked");
            record_refresh_failed(&namespace);
            state.record_failure(e.to_string());
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JobError;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;

    #[test]
    fn test_scheduler_config_default() {
        let config = SchedulerConfig::default();
        assert_eq!(config.queue_capacity, 1024);
        assert_eq!(config.max_concurrency, 8);
    }

    #[test]
    fn test_refresh_handle_stop() {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = RefreshHandle { shutdown_tx };

        assert!(!*shutdown_rx.borrow());
        handle.stop();
        assert!(shutdown_rx.has_changed().unwrap_or(false) || *shutdown_rx.borrow());
    }

    #[tokio::test]
    async fn test_runs_scheduled_work() {
        let (scheduler, _handle) = RefreshScheduler::start(SchedulerConfig::default());
        let runs = Arc::new(AtomicU32::new(0));

        for _ in 0..10 {
            let runs = Arc::clone(&runs);
            assert!(scheduler.schedule(RefreshRequest::new("ns", "u1", async move {
                runs.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })));
        }

        scheduler.idle().await;
        assert_eq!(runs.load(Ordering::SeqCst), 10);
        assert_eq!(scheduler.stats().completed, 10);
    }

    #[tokio::test]
    async fn test_failures_are_counted() {
        let (scheduler, _handle) = RefreshScheduler::start(SchedulerConfig::default());

        scheduler.schedule(RefreshRequest::new("ns", "u1", async {
            Err(JobError::fetch("ns", std::io::Error::other("backend down")))
        }));
        scheduler.schedule(RefreshRequest::new("ns", "u2", async {
            panic!("boom");
        }));

        scheduler.idle().await;
        let stats = scheduler.stats();
        assert_eq!(stats.failed, 2);
        assert_eq!(stats.completed, 0);
        assert!(scheduler.state().last_error().is_some());
    }

    #[tokio::test]
    async fn test_full_queue_drops_requests() {
        let config = SchedulerConfig {
            queue_capacity: 1,
            max_concurrency: 1,
        };
        let (scheduler, _handle) = RefreshScheduler::start(config);
        let gate = Arc::new(Notify::new());

        // Occupies the only permit.
        let blocker = Arc::clone(&gate);
        assert!(scheduler.schedule(RefreshRequest::new("ns", "u1", async move {
            blocker.notified().await;
            Ok(())
        })));
        tokio::time::sleep(Duration::from_millis(50)).await;

        // Held by the dispatcher while it waits for a permit.
        assert!(scheduler.schedule(RefreshRequest::new("ns", "u2", async { Ok(()) })));
        tokio::time::sleep(Duration::from_millis(50)).await;

        // Fills the queue.
        assert!(scheduler.schedule(RefreshRequest::new("ns", "u3", async { Ok(()) })));
        assert!(!scheduler.schedule(RefreshRequest::new("ns", "u4", async { Ok(()) })));
        assert_eq!(scheduler.stats().dropped, 1);

        gate.notify_one();
        scheduler.idle().await;
        assert_eq!(scheduler.stats().completed, 3);
    }

    #[tokio::test]
    async fn test_stopped_scheduler_drops_requests() {
        let (scheduler, handle) = RefreshScheduler::start(SchedulerConfig::default());
        handle.stop();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(!scheduler.schedule(RefreshRequest::new("ns", "u1", async { Ok(()) })));
        assert_eq!(scheduler.stats().dropped, 1);
        scheduler.idle().await;
    }
}
