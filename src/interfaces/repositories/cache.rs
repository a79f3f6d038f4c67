use async_trait::async_trait;

use crate::errors::CacheError;

/// Key-value cache backend with per-entry expiry. Injected explicitly so
/// the transformation cache can be backed by Redis in production and by
/// test doubles in tests.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), CacheError>;
    async fn ping(&self) -> Result<(), CacheError>;
}
