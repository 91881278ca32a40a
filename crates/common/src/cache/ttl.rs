use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::sync::Cache;

use crate::time::{Clock, SystemClock};

/// Default upper bound on cached entries.
pub const DEFAULT_MAX_CAPACITY: u64 = 10_000;

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    expires_at: Option<Instant>,
}

impl<V> Entry<V> {
    /// A TTL too long to represent as an instant never expires.
    fn new(value: V, ttl: Option<Duration>, now: Instant) -> Self {
        Self { value, expires_at: ttl.and_then(|ttl| now.checked_add(ttl)) }
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }
}

/// Thread-safe keyed cache where every entry carries its own optional TTL.
///
/// Entries without a TTL live until invalidated or until the cache is
/// dropped. Expired entries are treated as misses and evicted on read.
pub struct TtlCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    inner: Cache<K, Entry<V>>,
    clock: Arc<dyn Clock>,
}

impl<K, V> TtlCache<K, V>
where
    K: Hash + Eq + Clone + fmt::Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Create a cache measuring time with the system clock.
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        Self::with_clock(max_capacity, Arc::new(SystemClock))
    }

    /// Create a cache with a custom clock (for testing).
    #[must_use]
    pub fn with_clock(max_capacity: u64, clock: Arc<dyn Clock>) -> Self {
        Self { inner: Cache::builder().max_capacity(max_capacity).build(), clock }
    }

    /// Return the live value for `key`, evicting it first if it has expired.
    pub fn get(&self, key: &K) -> Option<V> {
        let entry = self.inner.get(key)?;
        if entry.is_expired(self.clock.now()) {
            tracing::debug!(key = ?key, "cache entry expired");
            self.inner.invalidate(key);
            return None;
        }
        Some(entry.value)
    }

    /// Whether a live entry exists for `key`.
    pub fn contains(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Insert `value`, replacing any previous entry.
    ///
    /// `ttl` of `None` keeps the entry until it is invalidated, as does a
    /// `ttl` too large to add to the current instant.
    pub fn insert(&self, key: K, value: V, ttl: Option<Duration>) {
        self.inner.insert(key, Entry::new(value, ttl, self.clock.now()));
    }

    /// Return the cached value or run `load` to produce and cache it.
    ///
    /// `load` returns the value together with its TTL. Concurrent callers
    /// asking for the same missing key wait for a single load. Errors are
    /// returned to every waiting caller and nothing is cached.
    ///
    /// `load` must not request the same key from this cache.
    ///
    /// # Errors
    ///
    /// Returns whatever error `load` produced.
    pub fn get_or_try_insert_with<E, F>(&self, key: K, load: F) -> Result<V, E>
    where
        E: Clone + Send + Sync + 'static,
        F: FnOnce() -> Result<(V, Option<Duration>), E>,
    {
        if let Some(value) = self.get(&key) {
            tracing::debug!(key = ?key, "cache hit");
            return Ok(value);
        }

        tracing::debug!(key = ?key, "cache miss");
        let clock = Arc::clone(&self.clock);
        let entry = self
            .inner
            .try_get_with(key, || {
                load().map(|(value, ttl)| Entry::new(value, ttl, clock.now()))
            })
            .map_err(Arc::unwrap_or_clone)?;

        Ok(entry.value)
    }

    /// Remove the entry for `key`, if any.
    pub fn invalidate(&self, key: &K) {
        self.inner.invalidate(key);
    }

    /// Remove every entry whose key matches `predicate`.
    pub fn invalidate_where<P>(&self, predicate: P)
    where
        P: Fn(&K) -> bool,
    {
        let doomed: Vec<Arc<K>> =
            self.inner.iter().map(|(key, _)| key).filter(|key| predicate(key)).collect();
        for key in doomed {
            self.inner.invalidate(key.as_ref());
        }
    }

    /// Remove every entry.
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }

    /// Number of live entries. Walks the cache, so keep it to tests and
    /// diagnostics.
    pub fn len(&self) -> usize {
        let now = self.clock.now();
        self.inner.iter().filter(|(_, entry)| !entry.is_expired(now)).count()
    }

    /// Whether no live entries remain.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> fmt::Debug for TtlCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlCache").field("clock", &self.clock).finish_non_exhaustive()
    }
}
