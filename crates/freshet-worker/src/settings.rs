//! Worker settings.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use freshet_jobs::{JobOverrides, SchedulerConfig};
use freshet_store::StoreConfig;
use serde::Deserialize;

/// Prefix of the environment variables that override settings, e.g.
/// `FRESHET_STORE__BACKEND=noop`.
pub const ENV_PREFIX: &str = "FRESHET";

/// Where the wiki data comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WikiSettings {
    /// JSON or YAML fixture file holding the wiki.
    pub fixture: Option<PathBuf>,
}

/// Everything the worker can be configured with.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Skip jobs that opt out during maintenance.
    pub maintenance_mode: bool,
    pub store: StoreConfig,
    pub scheduler: SchedulerConfig,
    pub wiki: WikiSettings,
    /// Policy overrides keyed by job namespace.
    pub jobs: HashMap<String, JobOverrides>,
}

impl Settings {
    /// Loads settings from an optional file, then `FRESHET_*` variables.
    ///
    /// The file format follows its extension (TOML, YAML or JSON). Nested
    /// keys are separated by `__` in variable names.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, None)
    }

    fn load_with_env(
        path: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?
            .try_deserialize()
    }
}
