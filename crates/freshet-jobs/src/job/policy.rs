//! Per-job caching policy.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use rand::Rng;

use crate::settings::JobOverrides;

/// Default lifetime of a cached value.
pub const DEFAULT_LIFETIME: Duration = Duration::from_secs(600);

/// Default time a refresh lock is honored.
pub const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::from_secs(60);

/// How long a cached value stays fresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifetime {
    /// Always the same duration.
    Fixed(Duration),
    /// Sampled uniformly in `[min, max]` on every store.
    Jittered { min: Duration, max: Duration },
}

impl Lifetime {
    /// Creates a jittered lifetime. The bounds may be given in any order.
    pub fn jittered(a: Duration, b: Duration) -> Self {
        Self::Jittered {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Returns a lifetime for one store operation.
    pub fn sample(&self) -> Duration {
        match *self {
            Self::Fixed(lifetime) => lifetime,
            Self::Jittered { min, max } => sample_between(min, max),
        }
    }
}

impl Default for Lifetime {
    fn default() -> Self {
        Self::Fixed(DEFAULT_LIFETIME)
    }
}

fn sample_between(min: Duration, max: Duration) -> Duration {
    if min >= max {
        return min;
    }
    rand::rng().random_range(min..=max)
}

type ExpiryFn = Arc<dyn Fn() -> SystemTime + Send + Sync>;
type EmptyFn<T> = Arc<dyn Fn() -> T + Send + Sync>;

/// Caching policy of a job.
///
/// Hooks that a job may customize are plain fields: the lifetime (or an
/// absolute expiry), the empty value and the refresh behavior.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use freshet_jobs::{JobPolicy, Lifetime};
///
/// let policy = JobPolicy::<Vec<u64>>::new("wiki.document_contributors")
///     .with_version(2)
///     .with_lifetime(Lifetime::Fixed(Duration::from_secs(12 * 3600)))
///     .with_refresh_timeout(Duration::from_secs(30))
///     .with_fetch_on_miss(false);
///
/// assert_eq!(policy.empty(), Vec::<u64>::new());
/// ```
pub struct JobPolicy<T> {
    namespace: String,
    version: u32,
    lifetime: Lifetime,
    expiry: Option<ExpiryFn>,
    refresh_timeout: Duration,
    fetch_on_miss: bool,
    stale_grace: Duration,
    generation_scope: Option<usize>,
    skip_in_maintenance: bool,
    empty: EmptyFn<T>,
}

impl<T: Default + 'static> JobPolicy<T> {
    /// Creates a policy whose empty value is `T::default()`.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self::with_empty(namespace, T::default)
    }
}

impl<T> JobPolicy<T> {
    /// Creates a policy with a custom empty value.
    pub fn with_empty(
        namespace: impl Into<String>,
        empty: impl Fn() -> T + Send + Sync + 'static,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            version: 1,
            lifetime: Lifetime::default(),
            expiry: None,
            refresh_timeout: DEFAULT_REFRESH_TIMEOUT,
            fetch_on_miss: true,
            stale_grace: Duration::ZERO,
            generation_scope: None,
            skip_in_maintenance: false,
            empty: Arc::new(empty),
        }
    }

    /// Sets the key version. Bumping it invalidates every cached value.
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Sets the lifetime.
    pub fn with_lifetime(mut self, lifetime: Lifetime) -> Self {
        self.lifetime = lifetime;
        self
    }

    /// Sets an absolute expiry hook. It takes precedence over the lifetime.
    pub fn with_expiry(mut self, expiry: impl Fn() -> SystemTime + Send + Sync + 'static) -> Self {
        self.expiry = Some(Arc::new(expiry));
        self
    }

    /// Expires values at `now + U[min, max]`.
    pub fn jittered_expiry(self, min: Duration, max: Duration) -> Self {
        let lifetime = Lifetime::jittered(min, max);
        self.with_expiry(move || SystemTime::now() + lifetime.sample())
    }

    /// Sets how long a refresh lock is honored.
    pub fn with_refresh_timeout(mut self, refresh_timeout: Duration) -> Self {
        self.refresh_timeout = refresh_timeout;
        self
    }

    /// Chooses between fetching inline on a miss and deferring the fetch.
    pub fn with_fetch_on_miss(mut self, fetch_on_miss: bool) -> Self {
        self.fetch_on_miss = fetch_on_miss;
        self
    }

    /// Keeps values readable for `grace` after they go stale.
    pub fn with_stale_grace(mut self, grace: Duration) -> Self {
        self.stale_grace = grace;
        self
    }

    /// Scopes a generation to the first `leading_args` arguments.
    pub fn generational(mut self, leading_args: usize) -> Self {
        self.generation_scope = Some(leading_args);
        self
    }

    /// Returns the empty value without touching the store in maintenance mode.
    pub fn skip_in_maintenance(mut self) -> Self {
        self.skip_in_maintenance = true;
        self
    }

    /// Applies configured overrides.
    ///
    /// A lifetime override replaces the expiry hook as well.
    pub fn apply_overrides(mut self, overrides: &JobOverrides) -> Self {
        if let Some(lifetime) = overrides.lifetime {
            self.lifetime = Lifetime::Fixed(lifetime);
            self.expiry = None;
        }
        if let Some(refresh_timeout) = overrides.refresh_timeout {
            self.refresh_timeout = refresh_timeout;
        }
        if let Some(fetch_on_miss) = overrides.fetch_on_miss {
            self.fetch_on_miss = fetch_on_miss;
        }
        if let Some(stale_grace) = overrides.stale_grace {
            self.stale_grace = stale_grace;
        }
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    pub fn refresh_timeout(&self) -> Duration {
        self.refresh_timeout
    }

    pub fn fetch_on_miss(&self) -> bool {
        self.fetch_on_miss
    }

    pub fn stale_grace(&self) -> Duration {
        self.stale_grace
    }

    pub fn generation_scope(&self) -> Option<usize> {
        self.generation_scope
    }

    pub fn skips_in_maintenance(&self) -> bool {
        self.skip_in_maintenance
    }

    /// Returns the empty value.
    pub fn empty(&self) -> T {
        (self.empty)()
    }

    /// When a value stored now stops being fresh.
    pub fn expires_at(&self) -> SystemTime {
        match &self.expiry {
            Some(expiry) => expiry(),
            None => SystemTime::now() + self.lifetime.sample(),
        }
    }

    /// How long the store keeps a value that goes stale at `expires_at`.
    pub fn store_ttl(&self, expires_at: SystemTime) -> Duration {
        let fresh = expires_at
            .duration_since(SystemTime::now())
            .unwrap_or(Duration::ZERO);
        if fresh.is_zero() {
            Duration::ZERO
        } else {
            fresh + self.stale_grace
        }
    }
}

impl<T> Clone for JobPolicy<T> {
    fn clone(&self) -> Self {
        Self {
            namespace: self.namespace.clone(),
            version: self.version,
            lifetime: self.lifetime,
            expiry: self.expiry.clone(),
            refresh_timeout: self.refresh_timeout,
            fetch_on_miss: self.fetch_on_miss,
            stale_grace: self.stale_grace,
            generation_scope: self.generation_scope,
            skip_in_maintenance: self.skip_in_maintenance,
            empty: Arc::clone(&self.empty),
        }
    }
}

impl<T> fmt::Debug for JobPolicy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobPolicy")
            .field("namespace", &self.namespace)
            .field("version", &self.version)
            .field("lifetime", &self.lifetime)
            .field("expiry", &self.expiry.is_some())
            .field("refresh_timeout", &self.refresh_timeout)
            .field("fetch_on_miss", &self.fetch_on_miss)
            .field("stale_grace", &self.stale_grace)
            .field("generation_scope", &self.generation_scope)
            .field("skip_in_maintenance", &self.skip_in_maintenance)
            .finish()
    }
}
