//! # Freshet Worker
//!
//! Loads [`Settings`], wires the wiki jobs to a store and a refresh
//! scheduler, and runs one [`Command`] against them.

pub mod commands;
pub mod settings;
pub mod telemetry;

// Re-exports
pub use commands::{Command, run_command};
pub use settings::{ENV_PREFIX, Settings, WikiSettings};
pub use telemetry::{init_metrics, init_tracing};
