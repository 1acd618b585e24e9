//! Response cache contract, key derivation and the in-memory backend.

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::time::{Duration, Instant};

use crate::config::{CacheConfig, DEFAULT_CACHE_MAX_ENTRIES};
use crate::error::CacheError;
use crate::query::QueryParams;

/// Pluggable key/value store for decoded responses.
///
/// Expired entries must be reported as misses.
#[async_trait]
pub trait ResponseCache: Send + Sync {
    /// Returns the cached value, or `None` on a miss.
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError>;

    /// Stores `value` under `key` for `ttl`.
    async fn set(&self, key: &str, value: &Value, ttl: Duration) -> Result<(), CacheError>;
}

/// Cache key for a request: lowercase hex SHA-256 of
/// `endpoint + ":" + canonical JSON of the query`.
///
/// The query keeps its insertion order, so predicate order changes the key.
#[must_use]
pub fn request_key(endpoint: &str, query: &QueryParams) -> String {
    let mut hasher = Sha256::new();
    hasher.update(endpoint.as_bytes());
    hasher.update(b":");
    hasher.update(query.to_canonical_json().as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Clone)]
struct CachedValue {
    value: Value,
    ttl: Duration,
}

struct PerEntryTtl;

impl Expiry<String, CachedValue> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Bounded in-process cache with a TTL per entry.
pub struct InMemoryResponseCache {
    cache: Cache<String, CachedValue>,
}

impl InMemoryResponseCache {
    #[must_use]
    pub fn new(max_entries: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .expire_after(PerEntryTtl)
            .build();

        Self { cache }
    }

    #[must_use]
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.max_entries)
    }

    /// Approximate number of live entries.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

impl Default for InMemoryResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_MAX_ENTRIES)
    }
}

impl std::fmt::Debug for InMemoryResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryResponseCache")
            .field("entry_count", &self.cache.entry_count())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ResponseCache for InMemoryResponseCache {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        Ok(self.cache.get(key).await.map(|entry| entry.value))
    }

    async fn set(&self, key: &str, value: &Value, ttl: Duration) -> Result<(), CacheError> {
        let entry = CachedValue {
            value: value.clone(),
            ttl,
        };
        self.cache.insert(key.to_owned(), entry).await;
        Ok(())
    }
}
