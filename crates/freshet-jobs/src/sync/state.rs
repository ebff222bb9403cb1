//! Refresh scheduler state tracking.

use parking_lot::RwLock;
use tokio::sync::Notify;

/// Point-in-time view of the scheduler counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Requests accepted into the queue.
    pub enqueued: u64,
    /// Refreshes that finished without error.
    pub completed: u64,
    /// Refreshes that ended in an error.
    pub failed: u64,
    /// Requests rejected by the queue or discarded at shutdown.
    pub dropped: u64,
}

impl SchedulerStats {
    /// Accepted requests not yet finished.
    pub fn pending(&self) -> u64 {
        self.enqueued
            .saturating_sub(self.completed)
            .saturating_sub(self.failed)
    }
}

/// Tracks the state of the refresh scheduler.
#[derive(Debug, Default)]
pub struct SchedulerState {
    /// Counters.
    stats: RwLock<SchedulerStats>,
    /// The last error message, if any.
    last_error: RwLock<Option<String>>,
    /// Woken whenever the pending count drops to zero.
    idle: Notify,
}

impl SchedulerState {
    /// Creates a new SchedulerState.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the counters.
    pub fn stats(&self) -> SchedulerStats {
        *self.stats.read()
    }

    /// Returns the number of accepted requests not yet finished.
    pub fn pending(&self) -> u64 {
        self.stats.read().pending()
    }

    /// Returns the last error message.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.read().clone()
    }

    /// Records an accepted request.
    pub fn record_enqueued(&self) {
        self.stats.write().enqueued += 1;
    }

    /// Records a successful refresh.
    pub fn record_success(&self) {
        let pending = {
            let mut stats = self.stats.write();
            stats.completed += 1;
            stats.pending()
        };
        self.notify_if_idle(pending);
    }

    /// Records a failed refresh.
    pub fn record_failure(&self, error: impl Into<String>) {
        let pending = {
            let mut stats = self.stats.write();
            let mut last_error = self.last_error.write();
            stats.failed += 1;
            *last_error = Some(error.into());
            stats.pending()
        };
        self.notify_if_idle(pending);
    }

    /// Moves requests counted as enqueued to dropped: rejected by the queue,
    /// or still queued at shutdown.
    pub fn record_abandoned(&self, count: u64) {
        let pending = {
            let mut stats = self.stats.write();
            stats.enqueued = stats.enqueued.saturating_sub(count);
            stats.dropped += count;
            stats.pending()
        };
        self.notify_if_idle(pending);
    }

    /// Waits until no accepted request is pending.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.pending() == 0 {
                return;
            }
            notified.await;
        }
    }

    fn notify_if_idle(&self, pending: u64) {
        if pending == 0 {
            self.idle.notify_waiters();
        }
    }
}
