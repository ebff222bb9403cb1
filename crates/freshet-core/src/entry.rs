//! Cached entries and refresh locks.

use std::time::{Duration, Instant, SystemTime};

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

/// The payload of a cache entry.
///
/// `Empty` is a real, cached result meaning "computed, found nothing". It is
/// distinct from a miss, which stores report as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum CachedValue {
    /// A serialized result.
    Data(serde_json::Value),
    /// The empty sentinel.
    Empty,
}

impl CachedValue {
    /// Serializes `value` into a `Data` payload.
    pub fn encode<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(Self::Data)
    }

    /// Decodes a `Data` payload. Returns `Ok(None)` for the empty sentinel.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<Option<T>, serde_json::Error> {
        match self {
            Self::Data(value) => T::deserialize(value).map(Some),
            Self::Empty => Ok(None),
        }
    }

    /// Returns true for the empty sentinel.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// A value stored under a job key.
///
/// `expires_at` is the point after which the value is considered stale. The
/// store may keep the entry a little longer when the owning job allows
/// stale reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The cached payload.
    pub value: CachedValue,
    /// When the value stops being fresh.
    pub expires_at: SystemTime,
}

impl CacheEntry {
    /// Creates an entry that expires at the given instant.
    pub fn new(value: CachedValue, expires_at: SystemTime) -> Self {
        Self { value, expires_at }
    }

    /// Creates an entry that stays fresh for `lifetime` from now.
    pub fn fresh_for(value: CachedValue, lifetime: Duration) -> Self {
        Self::new(value, SystemTime::now() + lifetime)
    }

    /// Creates an entry holding the empty sentinel.
    pub fn empty(expires_at: SystemTime) -> Self {
        Self::new(CachedValue::Empty, expires_at)
    }

    /// Returns true if the entry is still fresh at `now`.
    pub fn is_fresh_at(&self, now: SystemTime) -> bool {
        now < self.expires_at
    }

    /// Returns true if the entry is still fresh.
    pub fn is_fresh(&self) -> bool {
        self.is_fresh_at(SystemTime::now())
    }

    /// Time left until the entry goes stale, zero if it already has.
    pub fn remaining(&self) -> Duration {
        self.expires_at
            .duration_since(SystemTime::now())
            .unwrap_or(Duration::ZERO)
    }
}

/// Identifies one acquisition of a refresh lock.
///
/// Handed back on release, so a holder that overran its timeout cannot free
/// a lock someone else has since taken over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LockToken(u64);

impl LockToken {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// A per-key refresh lock.
///
/// A lock older than its timeout is considered abandoned and may be taken
/// over by any caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockEntry {
    /// Key the lock guards.
    pub key: String,
    /// Acquisition that holds the lock.
    pub token: LockToken,
    /// When the lock was taken.
    pub acquired_at: Instant,
    /// How long the lock is honored.
    pub timeout: Duration,
}

impl LockEntry {
    /// Creates a lock acquired now by `token`.
    pub fn acquire(key: impl Into<String>, timeout: Duration, token: LockToken) -> Self {
        Self {
            key: key.into(),
            token,
            acquired_at: Instant::now(),
            timeout,
        }
    }

    /// Returns true if the lock has outlived its timeout at `now`.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.acquired_at) >= self.timeout
    }

    /// Returns true if the lock has outlived its timeout.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Returns true if `token` is the acquisition holding this lock.
    pub fn is_held_by(&self, token: LockToken) -> bool {
        self.token == token
    }
}
