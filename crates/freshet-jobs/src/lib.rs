//! # Freshet Jobs
//!
//! Refresh-ahead memoization of expensive, side-effect-free computations.
//!
//! A [`Job`] combines a [`Fetch`] callback with a [`JobPolicy`] and serves
//! values from a [`CacheStore`](freshet_store::CacheStore):
//!
//! - values expire after a fixed or jittered lifetime, or at an absolute
//!   expiry chosen by the policy
//! - at most one worker recomputes a key at a time, guarded by a store lock
//!   that self-expires after the refresh timeout
//! - a miss either fetches inline or hands the work to the
//!   [`RefreshScheduler`] and returns the empty value at once
//! - "computed, found nothing" is cached as an empty sentinel, distinct
//!   from a miss
//! - bumping the version, or starting a new generation, invalidates cached
//!   values without deleting them
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use freshet_jobs::{Job, JobPolicy, JobRuntime, Lifetime, RefreshScheduler, SchedulerConfig, fetch_fn};
//! use freshet_store::MemoryStore;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), freshet_jobs::JobError> {
//! let (scheduler, _handle) = RefreshScheduler::start(SchedulerConfig::default());
//! let runtime = JobRuntime::new(Arc::new(MemoryStore::default())).with_scheduler(scheduler);
//!
//! let policy = JobPolicy::new("demo.lengths")
//!     .with_lifetime(Lifetime::jittered(Duration::from_secs(60), Duration::from_secs(120)))
//!     .with_fetch_on_miss(false);
//!
//! let lengths = Job::new(
//!     fetch_fn(|word: String| async move { Ok::<_, std::io::Error>(Some(word.len())) }),
//!     policy,
//!     runtime,
//! );
//!
//! // Cold key: empty value now, real value once the deferred refresh ran.
//! assert_eq!(lengths.get(&"freshet".to_string()).await?, 0);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod job;
pub mod metrics;
pub mod settings;
pub mod source;
pub mod sync;

// Re-exports
pub use error::{BoxError, JobError, JobResult};
pub use job::{Job, JobPolicy, JobRuntime, Lifetime, RefreshOutcome};
pub use metrics::{JobMetrics, register_job_metrics};
pub use settings::JobOverrides;
pub use source::{Fetch, FnFetch, fetch_fn};
pub use sync::{RefreshHandle, RefreshRequest, RefreshScheduler, SchedulerConfig, SchedulerStats};
