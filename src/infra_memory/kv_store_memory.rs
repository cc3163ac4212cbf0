use crate::domain_port::*;
use crate::logger::*;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tokio::time::Instant;

// Deadline used when `now + ttl` is not representable.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

fn deadline(now: Instant, ttl: Duration) -> Instant {
    now.checked_add(ttl).unwrap_or(now + FAR_FUTURE)
}

struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// In-process store for development and tests. Expired entries are dropped
/// when read and swept on every write. One lock guards the whole map so
/// `rename` is atomic.
#[derive(Default)]
pub struct MemoryKvStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.read()
            .map(|entries| entries.values().filter(|e| e.is_live(now)).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    fn raw_len(&self) -> usize {
        self.read().map(|entries| entries.len()).unwrap_or(0)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, Entry>>, KvStoreError> {
        self.entries
            .read()
            .map_err(|_| KvStoreError::Unavailable("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, Entry>>, KvStoreError> {
        self.entries
            .write()
            .map_err(|_| KvStoreError::Unavailable("memory store lock poisoned".to_string()))
    }

    /// Write guard with every expired entry already removed.
    fn write_swept(
        &self,
        now: Instant,
    ) -> Result<RwLockWriteGuard<'_, HashMap<String, Entry>>, KvStoreError> {
        let mut entries = self.write()?;
        entries.retain(|_, entry| entry.is_live(now));
        Ok(entries)
    }
}

#[async_trait::async_trait]
impl KeyValueStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KvStoreError> {
        let now = Instant::now();
        let mut entries = self.write()?;
        match entries.get(key).map(|e| e.is_live(now)) {
            Some(true) => Ok(entries.get(key).map(|e| e.value.clone())),
            Some(false) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), KvStoreError> {
        let now = Instant::now();
        self.write_swept(now)?.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: deadline(now, ttl),
            },
        );
        Ok(())
    }

    async fn exists(&self, key: &str) -> bool {
        let now = Instant::now();
        match self.read() {
            Ok(entries) => entries.get(key).is_some_and(|e| e.is_live(now)),
            Err(e) => {
                warn!("exists probe failed, reporting absent: {}", e);
                false
            }
        }
    }

    async fn delete(&self, key: &str) -> Result<(), KvStoreError> {
        self.write()?.remove(key);
        Ok(())
    }

    async fn rename(
        &self,
        old_key: &str,
        new_key: &str,
        ttl: Duration,
    ) -> Result<bool, KvStoreError> {
        let now = Instant::now();
        let mut entries = self.write_swept(now)?;
        if entries.get(new_key).is_some_and(|e| e.is_live(now)) {
            return Err(KvStoreError::KeyCollision(new_key.to_string()));
        }
        match entries.remove(old_key) {
            Some(entry) => {
                entries.insert(
                    new_key.to_string(),
                    Entry {
                        value: entry.value,
                        expires_at: deadline(now, ttl),
                    },
                );
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, KvStoreError> {
        let now = Instant::now();
        let entries = self.read()?;
        Ok(entries
            .get(key)
            .filter(|e| e.is_live(now))
            .map(|e| e.expires_at - now))
    }

    async fn clear(&self) -> Result<(), KvStoreError> {
        self.write()?.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn set_then_get_overwrites() {
        let store = MemoryKvStore::new();
        store.set("k", "one", TTL).await.unwrap();
        store.set("k", "two", TTL).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("two"));
        assert!(store.exists("k").await);
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_missing_key_is_ok() {
        let store = MemoryKvStore::new();
        store.delete("nope").await.unwrap();
        store.set("k", "v", TTL).await.unwrap();
        store.delete("k").await.unwrap();
        store.delete("k").await.unwrap();
        assert!(!store.exists("k").await);
    }

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let store = MemoryKvStore::new();
        store.set("k", "v", Duration::from_secs(5)).await.unwrap();
        tokio::time::advance(Duration::from_secs(4)).await;
        assert!(store.exists("k").await);
        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(!store.exists("k").await);
        assert_eq!(store.get("k").await.unwrap(), None);
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn rename_moves_value_and_resets_ttl() {
        let store = MemoryKvStore::new();
        store.set("old", "v", Duration::from_secs(10)).await.unwrap();
        tokio::time::advance(Duration::from_secs(8)).await;

        assert!(store.rename("old", "new", TTL).await.unwrap());
        assert!(!store.exists("old").await);
        assert_eq!(store.get("new").await.unwrap().as_deref(), Some("v"));
        assert_eq!(store.ttl("new").await.unwrap(), Some(TTL));
    }

    #[tokio::test]
    async fn rename_of_missing_key_reports_false() {
        let store = MemoryKvStore::new();
        assert!(!store.rename("old", "new", TTL).await.unwrap());
        assert!(!store.exists("new").await);
    }

    #[tokio::test]
    async fn rename_refuses_to_overwrite_live_target() {
        let store = MemoryKvStore::new();
        store.set("old", "a", TTL).await.unwrap();
        store.set("new", "b", TTL).await.unwrap();
        let err = store.rename("old", "new", TTL).await.unwrap_err();
        assert!(matches!(err, KvStoreError::KeyCollision(_)));
        assert_eq!(store.get("old").await.unwrap().as_deref(), Some("a"));
    }

    #[tokio::test(start_paused = true)]
    async fn writes_sweep_expired_entries() {
        let store = MemoryKvStore::new();
        for i in 0..1000 {
            store.set(&format!("old{}", i), "v", Duration::from_secs(1)).await.unwrap();
        }
        tokio::time::advance(Duration::from_secs(10)).await;
        for i in 0..1000 {
            store.set(&format!("new{}", i), "v", TTL).await.unwrap();
        }
        assert_eq!(store.len(), 1000);
        assert_eq!(store.raw_len(), 1000);

        store.set("short", "v", Duration::from_secs(1)).await.unwrap();
        tokio::time::advance(Duration::from_secs(2)).await;
        store.rename("new0", "moved", TTL).await.unwrap();
        assert_eq!(store.raw_len(), 1000);
    }

    #[tokio::test]
    async fn huge_ttl_does_not_overflow() {
        let store = MemoryKvStore::new();
        let huge = Duration::from_secs(u64::MAX / 2);
        store.set("k", "v", huge).await.unwrap();
        assert!(store.exists("k").await);
        assert!(store.rename("k", "moved", huge).await.unwrap());
        assert!(store.ttl("moved").await.unwrap().unwrap() > TTL);
    }

    #[tokio::test]
    async fn clear_wipes_everything() {
        let store = MemoryKvStore::new();
        store.set("a", "1", TTL).await.unwrap();
        store.set("b", "2", TTL).await.unwrap();
        store.clear().await.unwrap();
        assert_eq!(store.len(), 0);
    }
}
