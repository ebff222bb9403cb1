//! Shared runtime handed to every job.

use std::fmt;
use std::sync::Arc;

use freshet_store::CacheStore;

use crate::sync::RefreshScheduler;

/// Everything a job needs besides its fetch callback and policy.
///
/// Cheap to clone; every job built from the same runtime shares its store
/// and scheduler.
#[derive(Clone)]
pub struct JobRuntime {
    store: Arc<dyn CacheStore>,
    scheduler: Option<RefreshScheduler>,
    maintenance_mode: bool,
}

impl JobRuntime {
    /// Creates a runtime without a scheduler. Deferred refreshes are dropped.
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self {
            store,
            scheduler: None,
            maintenance_mode: false,
        }
    }

    /// Sets the scheduler that runs deferred refreshes.
    pub fn with_scheduler(mut self, scheduler: RefreshScheduler) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Enables or disables maintenance mode.
    pub fn with_maintenance_mode(mut self, enabled: bool) -> Self {
        self.maintenance_mode = enabled;
        self
    }

    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    pub fn scheduler(&self) -> Option<&RefreshScheduler> {
        self.scheduler.as_ref()
    }

    pub fn maintenance_mode(&self) -> bool {
        self.maintenance_mode
    }
}

impl fmt::Debug for JobRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobRuntime")
            .field("store", &self.store.name())
            .field("scheduler", &self.scheduler.is_some())
            .field("maintenance_mode", &self.maintenance_mode)
            .finish()
    }
}
