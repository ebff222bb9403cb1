//! Deferred refresh scheduling.
//!
//! Jobs that defer their fetch hand a [`RefreshRequest`] to the
//! [`RefreshScheduler`], which runs it on a bounded pool of tokio tasks.

mod scheduler;
mod state;

pub use scheduler::{RefreshFuture, RefreshHandle, RefreshRequest, RefreshScheduler, SchedulerConfig};
pub use state::{SchedulerState, SchedulerStats};
