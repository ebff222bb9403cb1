//! The job engine and its policy.

mod engine;
mod policy;
mod runtime;

pub use engine::{Job, RefreshOutcome};
pub use policy::{DEFAULT_LIFETIME, DEFAULT_REFRESH_TIMEOUT, JobPolicy, Lifetime};
pub use runtime::JobRuntime;
