//! Per-job overrides loaded from configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Overrides for a single job, keyed by namespace in the settings file.
///
/// Durations use humantime syntax (`"3h"`, `"90s"`). Unset fields keep the
/// job's built-in policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobOverrides {
    /// Fixed lifetime of cached values.
    #[serde(with = "humantime_serde")]
    pub lifetime: Option<Duration>,

    /// How long a refresh lock is honored.
    #[serde(with = "humantime_serde")]
    pub refresh_timeout: Option<Duration>,

    /// Fetch inline on a miss instead of deferring.
    pub fetch_on_miss: Option<bool>,

    /// How long stale values may still be served.
    #[serde(with = "humantime_serde")]
    pub stale_grace: Option<Duration>,
}
