//! Per-client cache of tokens, dataset records and query results
//!
//! One [`DatasetCache`] is owned by one client for the length of a sync run.
//! The token entry expires on its own; everything else lives until it is
//! invalidated by a create/delete, an explicit flush, or the client being
//! dropped.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use datasync_common::{Clock, SystemClock, TtlCache};
use datasync_domain::{AccessToken, Dataset, QueryResult, Result, SyncError};
use sha2::{Digest, Sha256};

const MAX_ENTRIES: u64 = 4_096;

/// Cache key. Renders as `token`, `datasets`, `dataset:<id>` or
/// `query:<dataset_id>:<sha256(sql)>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Token,
    DatasetList,
    Dataset(String),
    Query { dataset_id: String, sql_digest: String },
}

impl CacheKey {
    /// Key for a query result, hashing the SQL text.
    pub fn query(dataset_id: &str, sql: &str) -> Self {
        Self::Query {
            dataset_id: dataset_id.to_string(),
            sql_digest: hex::encode(Sha256::digest(sql.as_bytes())),
        }
    }

    pub const fn is_token(&self) -> bool {
        matches!(self, Self::Token)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token => f.write_str("token"),
            Self::DatasetList => f.write_str("datasets"),
            Self::Dataset(id) => write!(f, "dataset:{id}"),
            Self::Query { dataset_id, sql_digest } => write!(f, "query:{dataset_id}:{sql_digest}"),
        }
    }
}

/// Cached payloads. Shared behind `Arc` so hits never deep-copy.
#[derive(Debug, Clone)]
pub enum CachedValue {
    Token(Arc<AccessToken>),
    Datasets(Arc<Vec<Dataset>>),
    Dataset(Arc<Dataset>),
    Query(Arc<QueryResult>),
}

impl CachedValue {
    fn into_token(self) -> Option<Arc<AccessToken>> {
        match self {
            Self::Token(token) => Some(token),
            _ => None,
        }
    }

    fn into_datasets(self) -> Option<Arc<Vec<Dataset>>> {
        match self {
            Self::Datasets(datasets) => Some(datasets),
            _ => None,
        }
    }

    fn into_dataset(self) -> Option<Arc<Dataset>> {
        match self {
            Self::Dataset(dataset) => Some(dataset),
            _ => None,
        }
    }

    fn into_query(self) -> Option<Arc<QueryResult>> {
        match self {
            Self::Query(result) => Some(result),
            _ => None,
        }
    }
}

/// Typed facade over the keyed TTL store.
#[derive(Debug)]
pub struct DatasetCache {
    store: TtlCache<CacheKey, CachedValue>,
}

impl Default for DatasetCache {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Cache measuring token expiry with `clock` (for testing).
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self { store: TtlCache::with_clock(MAX_ENTRIES, clock) }
    }

    /// Cached token, or the result of `fetch` cached for its
    /// [`cache_ttl`](AccessToken::cache_ttl).
    ///
    /// A token whose TTL is zero is returned to this caller but never served
    /// from cache.
    pub fn token<F>(&self, fetch: F) -> Result<Arc<AccessToken>>
    where
        F: FnOnce() -> Result<AccessToken>,
    {
        self.load(
            CacheKey::Token,
            || {
                let token = fetch()?;
                let ttl = token.cache_ttl();
                Ok((CachedValue::Token(Arc::new(token)), Some(ttl)))
            },
            CachedValue::into_token,
        )
    }

    /// Cached dataset list, or the result of `fetch` kept until invalidated.
    pub fn datasets<F>(&self, fetch: F) -> Result<Arc<Vec<Dataset>>>
    where
        F: FnOnce() -> Result<Vec<Dataset>>,
    {
        self.load(
            CacheKey::DatasetList,
            || Ok((CachedValue::Datasets(Arc::new(fetch()?)), None)),
            CachedValue::into_datasets,
        )
    }

    /// Cached full record for `dataset_id`, or the result of `fetch`.
    pub fn dataset<F>(&self, dataset_id: &str, fetch: F) -> Result<Arc<Dataset>>
    where
        F: FnOnce() -> Result<Dataset>,
    {
        self.load(
            CacheKey::Dataset(dataset_id.to_string()),
            || Ok((CachedValue::Dataset(Arc::new(fetch()?)), None)),
            CachedValue::into_dataset,
        )
    }

    /// Cached result of `sql` against `dataset_id`, or the result of `fetch`.
    pub fn query<F>(&self, dataset_id: &str, sql: &str, fetch: F) -> Result<Arc<QueryResult>>
    where
        F: FnOnce() -> Result<QueryResult>,
    {
        self.load(
            CacheKey::query(dataset_id, sql),
            || Ok((CachedValue::Query(Arc::new(fetch()?)), None)),
            CachedValue::into_query,
        )
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.store.contains(key)
    }

    pub fn invalidate_token(&self) {
        self.store.invalidate(&CacheKey::Token);
    }

    pub fn invalidate_list(&self) {
        self.store.invalidate(&CacheKey::DatasetList);
    }

    pub fn invalidate_dataset(&self, dataset_id: &str) {
        self.store.invalidate(&CacheKey::Dataset(dataset_id.to_string()));
    }

    /// Drop every list, dataset and query entry. The token is kept.
    pub fn flush(&self) {
        self.store.invalidate_where(|key| !key.is_token());
    }

    /// Drop everything, the token included.
    pub fn clear(&self) {
        self.store.invalidate_all();
    }

    fn load<T, F>(
        &self,
        key: CacheKey,
        load: F,
        extract: fn(CachedValue) -> Option<Arc<T>>,
    ) -> Result<Arc<T>>
    where
        F: FnOnce() -> Result<(CachedValue, Option<Duration>)>,
    {
        let described = key.to_string();
        let value = self.store.get_or_try_insert_with(key, load)?;
        extract(value).ok_or_else(|| {
            SyncError::Internal(format!("cache entry '{described}' holds an unexpected value"))
        })
    }
}
