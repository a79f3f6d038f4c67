use async_trait::async_trait;
use deadpool_redis::Pool;
use redis::AsyncCommands;

use crate::errors::CacheError;
use crate::repositories::cache::CacheStore;

pub const DEFAULT_LEASE_SECS: u64 = 3600;

/// Redis-backed cache store. The pool is optional: a deployment without
/// Redis runs with every lookup missing, which only costs hit-rate.
#[derive(Clone)]
pub struct RedisCacheStore {
    pool: Option<Pool>,
}

impl RedisCacheStore {
    pub fn new(pool: Option<Pool>) -> Self {
        RedisCacheStore { pool }
    }

    pub fn from_url(redis_url: Option<&str>) -> Self {
        let pool = redis_url.and_then(|url| {
            let cfg = deadpool_redis::Config::from_url(url);
            cfg.create_pool(Some(deadpool_redis::Runtime::Tokio1))
                .map_err(|e| tracing::error!("Redis pool creation error: {}", e))
                .ok()
        });

        RedisCacheStore { pool }
    }

    async fn connection(&self) -> Result<deadpool_redis::Connection, CacheError> {
        let pool = self.pool.as_ref().ok_or(CacheError::NotConfigured)?;
        pool.get()
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.connection().await?;
        conn.get(key)
            .await
            .map_err(|e| CacheError::Operation(e.to_string()))
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        conn.set_ex::<_, _, ()>(key, value, ttl_secs)
            .await
            .map_err(|e| CacheError::Operation(e.to_string()))
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map(|_| ())
            .map_err(|e| CacheError::Operation(e.to_string()))
    }
}

/// Memoization layer mapping (content id, canonical descriptor) keys to
/// derived-asset locators with a bounded lease. Backend failures never
/// surface to the caller: a failed `lookup` is a miss and a failed
/// `store` is dropped, so correctness is carried by re-dispatching.
pub struct TransformCache<C: CacheStore> {
    store: C,
    default_lease_secs: u64,
}

impl<C: CacheStore> TransformCache<C> {
    pub fn new(store: C, default_lease_secs: u64) -> Self {
        TransformCache {
            store,
            default_lease_secs,
        }
    }

    pub fn with_default_lease(store: C) -> Self {
        Self::new(store, DEFAULT_LEASE_SECS)
    }

    pub fn default_lease(&self) -> u64 {
        self.default_lease_secs
    }

    pub fn backend(&self) -> &C {
        &self.store
    }

    /// A present, unexpired entry yields its locator; everything else
    /// (absent key, elapsed lease, unreachable backend) is a miss.
    pub async fn lookup(&self, key: &str) -> Option<String> {
        match self.store.get(key).await {
            Ok(hit) => hit,
            Err(CacheError::NotConfigured) => None,
            Err(e) => {
                tracing::warn!("Cache lookup degraded to miss for {}: {}", key, e);
                None
            }
        }
    }

    /// Inserts or replaces the entry and resets its lease. Write failures
    /// are logged and dropped.
    pub async fn store(&self, key: &str, locator: &str, lease_secs: u64) {
        match self.store.set_ex(key, locator, lease_secs).await {
            Ok(()) => tracing::info!("Cached transformed asset for key: {}", key),
            Err(CacheError::NotConfigured) => {}
            Err(e) => tracing::warn!("Cache store dropped for {}: {}", key, e),
        }
    }
}
