use std::time::Duration;

/// TTL-aware key-value backend holding serialized session records.
///
/// Implementations must be safe to share across concurrent requests.
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Stored value, or `None` if the key does not exist.
    async fn get(&self, key: &str) -> Result<Option<String>, KvStoreError>;

    /// Unconditional upsert, replacing any previous value and TTL.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), KvStoreError>;

    /// Existence probe. Backend failures read as `false`.
    async fn exists(&self, key: &str) -> bool;

    /// Removes the key. A missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), KvStoreError>;

    /// Atomically moves the value under `old_key` to `new_key` with a fresh
    /// `ttl`. Returns `false` if `old_key` was already gone. Fails with
    /// [`KvStoreError::KeyCollision`] rather than overwrite a live `new_key`.
    async fn rename(
        &self,
        old_key: &str,
        new_key: &str,
        ttl: Duration,
    ) -> Result<bool, KvStoreError>;

    /// Remaining time-to-live; `None` for a missing key or one without expiry.
    async fn ttl(&self, key: &str) -> Result<Option<Duration>, KvStoreError>;

    /// Wipes every key in this store's namespace.
    async fn clear(&self) -> Result<(), KvStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum KvStoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store call timed out after {0:?}")]
    Timeout(Duration),
    #[error("rename target {0} already exists")]
    KeyCollision(String),
}
