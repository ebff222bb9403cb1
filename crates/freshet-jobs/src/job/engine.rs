//! Refresh-ahead job engine.

use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use freshet_core::{
    CacheEntry, CachedValue, JobKey, KeyArg, KeyArgs, LockToken, key::canonical_args,
};
use freshet_store::CacheStore;
use rand::Rng;
use tracing::{debug, warn};

use super::{JobPolicy, JobRuntime};
use crate::error::{JobError, JobResult};
use crate::metrics::JobMetrics;
use crate::source::Fetch;
use crate::sync::RefreshRequest;

/// How long a generation number is kept.
const GENERATION_TTL: Duration = Duration::from_secs(365 * 24 * 3600);

/// Pause between reads while another caller creates a generation.
const GENERATION_RETRY: Duration = Duration::from_millis(5);

/// Result of a lock-guarded refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome<T> {
    /// The value was fetched and stored.
    Refreshed(T),
    /// Another worker stored a fresh value first; no fetch happened.
    AlreadyFresh(T),
    /// Another worker holds the refresh lock.
    Locked,
}

impl<T> RefreshOutcome<T> {
    /// Returns the value, if the refresh produced one.
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Refreshed(value) | Self::AlreadyFresh(value) => Some(value),
            Self::Locked => None,
        }
    }
}

/// A memoized computation with refresh-ahead semantics.
///
/// Combines a fetch callback, a policy and a runtime. Clones share
/// everything.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use freshet_jobs::{Job, JobPolicy, JobRuntime, fetch_fn};
/// use freshet_store::MemoryStore;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), freshet_jobs::JobError> {
/// let runtime = JobRuntime::new(Arc::new(MemoryStore::default()));
/// let squares = Job::new(
///     fetch_fn(|n: u64| async move { Ok::<_, std::io::Error>(Some(n * n)) }),
///     JobPolicy::new("demo.squares"),
///     runtime,
/// );
///
/// assert_eq!(squares.get(&12).await?, 144);
/// # Ok(())
/// # }
/// ```
pub struct Job<F: Fetch> {
    inner: Arc<JobInner<F>>,
}

struct JobInner<F: Fetch> {
    fetcher: F,
    policy: JobPolicy<F::Output>,
    runtime: JobRuntime,
    metrics: JobMetrics,
}

impl<F: Fetch> Clone for Job<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F: Fetch> Job<F> {
    /// Creates a new job.
    pub fn new(fetcher: F, policy: JobPolicy<F::Output>, runtime: JobRuntime) -> Self {
        let metrics = JobMetrics::new(policy.namespace());
        Self {
            inner: Arc::new(JobInner {
                fetcher,
                policy,
                runtime,
                metrics,
            }),
        }
    }

    pub fn namespace(&self) -> &str {
        self.inner.policy.namespace()
    }

    pub fn policy(&self) -> &JobPolicy<F::Output> {
        &self.inner.policy
    }

    pub fn metrics(&self) -> &JobMetrics {
        &self.inner.metrics
    }

    pub fn fetcher(&self) -> &F {
        &self.inner.fetcher
    }

    fn store(&self) -> &Arc<dyn CacheStore> {
        self.inner.runtime.store()
    }

    /// Returns the value for `args`.
    ///
    /// A cached value (the empty sentinel included) is returned as is. On a
    /// miss the value is fetched inline, or a deferred refresh is scheduled
    /// when the policy disables `fetch_on_miss`. Callers that lose the lock
    /// race, and callers of a deferring job, get the empty value at once.
    ///
    /// A stale value (past `expires_at` but within the stale grace) is
    /// returned too. The first reader to see it pushes its expiry out by the
    /// refresh timeout and queues one refresh; later readers get a hit.
    pub async fn get(&self, args: &F::Args) -> JobResult<F::Output> {
        let policy = &self.inner.policy;

        if policy.skips_in_maintenance() && self.inner.runtime.maintenance_mode() {
            debug!(namespace = %self.namespace(), "Maintenance mode, serving empty value");
            return Ok(policy.empty());
        }

        let Some(key) = self.resolve_key(args).await? else {
            return Ok(policy.empty());
        };
        let key = key.to_string();

        if let Some(entry) = self.store().get(&key).await? {
            if entry.is_fresh() {
                debug!(namespace = %self.namespace(), key = %key, "Cache hit");
            } else {
                debug!(namespace = %self.namespace(), key = %key, "Serving stale value");
                self.hold_stale(&key, &entry).await?;
                self.enqueue_refresh(args.clone(), true);
            }
            return self.decode(&entry);
        }

        debug!(namespace = %self.namespace(), key = %key, "Cache miss");

        if !policy.fetch_on_miss() {
            self.schedule_refresh(args.clone());
            return Ok(policy.empty());
        }

        Ok(self
            .refresh_key(&key, args, false)
            .await?
            .into_value()
            .unwrap_or_else(|| policy.empty()))
    }

    /// Runs the lock-guarded fetch-and-store sequence for `args`.
    ///
    /// Returns `Locked` if another caller holds the refresh lock, or is still
    /// creating the generation of a generational job.
    pub async fn refresh(&self, args: &F::Args) -> JobResult<RefreshOutcome<F::Output>> {
        self.refresh_with(args, false).await
    }

    /// Hands a refresh of `args` to the scheduler.
    ///
    /// Returns false if the runtime has no scheduler or the request was
    /// dropped.
    pub fn schedule_refresh(&self, args: F::Args) -> bool {
        self.enqueue_refresh(args, false)
    }

    /// Returns the raw cached entry for `args` without fetching.
    pub async fn peek(&self, args: &F::Args) -> JobResult<Option<CacheEntry>> {
        match self.resolve_key(args).await? {
            Some(key) => Ok(self.store().get(&key.to_string()).await?),
            None => Ok(None),
        }
    }

    /// Returns the cache key for `args`.
    ///
    /// For generational jobs this reads (or creates) the current generation.
    /// If another caller is creating it, waits until it is stored.
    pub async fn key(&self, args: &F::Args) -> JobResult<JobKey> {
        loop {
            if let Some(key) = self.resolve_key(args).await? {
                return Ok(key);
            }
            tokio::time::sleep(GENERATION_RETRY).await;
        }
    }

    /// Starts a new generation for the given leading arguments, so every
    /// value cached under the old one misses from now on.
    ///
    /// Returns the new generation, or `None` if the job is not generational.
    pub async fn invalidate_generation(&self, scope: &impl KeyArgs) -> JobResult<Option<u64>> {
        let Some(size) = self.inner.policy.generation_scope() else {
            warn!(namespace = %self.namespace(), "Job is not generational");
            return Ok(None);
        };

        let mut atoms = scope.key_args();
        atoms.truncate(size);
        let key = self.generation_key(&atoms);
        let generation = self.store_generation(&key).await?;

        debug!(
            namespace = %self.namespace(),
            scope = %canonical_args(&atoms),
            generation,
            "Started new generation"
        );
        Ok(Some(generation))
    }

    /// Builds the key for `args`, or `None` while another caller creates
    /// the generation it belongs to.
    async fn resolve_key(&self, args: &F::Args) -> JobResult<Option<JobKey>> {
        let policy = &self.inner.policy;
        let key = JobKey::new(policy.namespace(), policy.version(), args.key_args());

        let Some(scope) = policy.generation_scope() else {
            return Ok(Some(key));
        };

        let scope = &key.args()[..scope.min(key.args().len())];
        Ok(self
            .generation(scope)
            .await?
            .map(|generation| key.with_generation(generation)))
    }

    fn generation_key(&self, scope: &[KeyArg]) -> String {
        let policy = &self.inner.policy;
        JobKey::generation_key(policy.namespace(), policy.version(), scope)
    }

    /// Reads the generation of `scope`, creating it on first use.
    ///
    /// Creation is guarded by the store lock on the generation key, so
    /// concurrent first callers agree on one generation. Callers that lose
    /// the lock get `None`.
    async fn generation(&self, scope: &[KeyArg]) -> JobResult<Option<u64>> {
        let key = self.generation_key(scope);

        if let Some(generation) = self.read_generation(&key).await? {
            return Ok(Some(generation));
        }

        let store = self.store();
        let timeout = self.inner.policy.refresh_timeout();
        let Some(token) = store.try_acquire_lock(&key, timeout).await? else {
            self.inner.metrics.record_contention();
            debug!(namespace = %self.namespace(), key = %key, "Generation being created elsewhere");
            return Ok(None);
        };

        let created = match self.read_generation(&key).await {
            Ok(Some(generation)) => Ok(generation),
            Ok(None) => self.store_generation(&key).await,
            Err(e) => Err(e),
        };

        self.release(&key, token).await;
        created.map(Some)
    }

    async fn read_generation(&self, key: &str) -> JobResult<Option<u64>> {
        match self.store().get(key).await? {
            Some(entry) => entry
                .value
                .decode::<u64>()
                .map_err(|e| JobError::codec(self.namespace(), e)),
            None => Ok(None),
        }
    }

    async fn store_generation(&self, key: &str) -> JobResult<u64> {
        let generation: u64 = rand::rng().random();
        let value =
            CachedValue::encode(&generation).map_err(|e| JobError::codec(self.namespace(), e))?;
        self.store()
            .set(key, CacheEntry::fresh_for(value, GENERATION_TTL), GENERATION_TTL)
            .await?;

        Ok(generation)
    }

    /// Re-stores a stale entry as fresh for one refresh timeout, so readers
    /// stop queueing refreshes while one is pending.
    async fn hold_stale(&self, key: &str, entry: &CacheEntry) -> JobResult<()> {
        let policy = &self.inner.policy;
        let expires_at = SystemTime::now() + policy.refresh_timeout();

        self.store()
            .set(
                key,
                CacheEntry::new(entry.value.clone(), expires_at),
                policy.store_ttl(expires_at),
            )
            .await?;
        Ok(())
    }

    fn enqueue_refresh(&self, args: F::Args, force: bool) -> bool {
        let Some(scheduler) = self.inner.runtime.scheduler() else {
            warn!(
                namespace = %self.namespace(),
                "No refresh scheduler configured, dropping deferred refresh"
            );
            return false;
        };

        let label = canonical_args(&args.key_args());
        let job = self.clone();
        let request = RefreshRequest::new(self.namespace(), label, async move {
            job.refresh_with(&args, force).await.map(|_| ())
        });

        let accepted = scheduler.schedule(request);
        if accepted {
            self.inner.metrics.record_deferred();
        }
        accepted
    }

    async fn refresh_with(
        &self,
        args: &F::Args,
        force: bool,
    ) -> JobResult<RefreshOutcome<F::Output>> {
        match self.resolve_key(args).await? {
            Some(key) => self.refresh_key(&key.to_string(), args, force).await,
            None => Ok(RefreshOutcome::Locked),
        }
    }

    async fn refresh_key(
        &self,
        key: &str,
        args: &F::Args,
        force: bool,
    ) -> JobResult<RefreshOutcome<F::Output>> {
        let store = self.store();
        let timeout = self.inner.policy.refresh_timeout();

        let Some(token) = store.try_acquire_lock(key, timeout).await? else {
            self.inner.metrics.record_contention();
            debug!(namespace = %self.namespace(), key = %key, "Refresh lock held elsewhere");
            return Ok(RefreshOutcome::Locked);
        };

        let outcome = self.refresh_locked(key, args, force).await;
        self.release(key, token).await;

        outcome
    }

    async fn release(&self, key: &str, token: LockToken) {
        if let Err(e) = self.store().release_lock(key, token).await {
            warn!(
                namespace = %self.namespace(),
                key = %key,
                error = %e,
                "Failed to release refresh lock"
            );
        }
    }

    /// Fetches and stores the value. Unless `force` is set, a fresh entry
    /// stored by another worker since the miss is returned instead.
    async fn refresh_locked(
        &self,
        key: &str,
        args: &F::Args,
        force: bool,
    ) -> JobResult<RefreshOutcome<F::Output>> {
        let policy = &self.inner.policy;
        let metrics = &self.inner.metrics;

        if !force {
            if let Some(entry) = self.store().get(key).await? {
                if entry.is_fresh() {
                    debug!(namespace = %self.namespace(), key = %key, "Value already refreshed");
                    return self.decode(&entry).map(RefreshOutcome::AlreadyFresh);
                }
            }
        }

        let start = Instant::now();
        let fetched = match self.inner.fetcher.fetch(args).await {
            Ok(fetched) => {
                metrics.record_fetch(start.elapsed());
                fetched
            },
            Err(e) => {
                metrics.record_fetch_error();
                return Err(JobError::fetch(self.namespace(), e));
            },
        };

        let value = match &fetched {
            Some(value) => {
                CachedValue::encode(value).map_err(|e| JobError::codec(self.namespace(), e))?
            },
            None => CachedValue::Empty,
        };

        let expires_at = policy.expires_at();
        let ttl = policy.store_ttl(expires_at);
        self.store()
            .set(key, CacheEntry::new(value, expires_at), ttl)
            .await?;

        debug!(
            namespace = %self.namespace(),
            key = %key,
            ttl = ?ttl,
            empty = fetched.is_none(),
            "Stored refreshed value"
        );

        Ok(RefreshOutcome::Refreshed(
            fetched.unwrap_or_else(|| policy.empty()),
        ))
    }

    fn decode(&self, entry: &CacheEntry) -> JobResult<F::Output> {
        entry
            .value
            .decode::<F::Output>()
            .map(|value| value.unwrap_or_else(|| self.inner.policy.empty()))
            .map_err(|e| JobError::codec(self.namespace(), e))
    }
}
