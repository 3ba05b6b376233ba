//! Key-value cache abstraction the rate service is built on

use async_trait::async_trait;

/// A get/set store. Entries never expire on their own; callers that need
/// freshness encode it in the key.
#[async_trait]
pub trait Cache<K, V>: Send + Sync
where
    K: Send + Sync,
    V: Send + Sync,
{
    async fn get(&self, key: &K) -> Option<V>;
    async fn set(&self, key: K, value: V);
}
