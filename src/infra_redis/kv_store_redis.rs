use crate::domain_port::*;
use crate::logger::*;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, RedisResult, Script};
use std::future::Future;
use std::time::Duration;

const RENAME_WITH_TTL: &str = include_str!("rename_with_ttl.lua");
const SCAN_BATCH: usize = 500;

pub struct RedisKvStore {
    conn: ConnectionManager,
    prefix: String,
    timeout: Duration,
    rename_script: Script,
}

impl RedisKvStore {
    /// `prefix` namespaces every key as `prefix:key`; an empty prefix uses
    /// bare keys and makes `clear` flush the whole database.
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>, timeout: Duration) -> Self {
        RedisKvStore {
            conn,
            prefix: prefix.into(),
            timeout,
            rename_script: Script::new(RENAME_WITH_TTL),
        }
    }

    fn key(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}:{}", self.prefix, key)
        }
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T, KvStoreError>
    where
        F: Future<Output = RedisResult<T>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(KvStoreError::Unavailable(e.to_string())),
            Err(_) => Err(KvStoreError::Timeout(self.timeout)),
        }
    }
}

/// `SCAN MATCH` pattern selecting exactly the keys under `prefix`.
fn scan_pattern(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 2);
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push_str(":*");
    pattern
}

fn millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

#[async_trait::async_trait]
impl KeyValueStore for RedisKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KvStoreError> {
        let key = self.key(key);
        let mut conn = self.conn.clone();
        self.bounded(conn.get(&key)).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), KvStoreError> {
        let key = self.key(key);
        let mut conn = self.conn.clone();
        let _: () = self.bounded(conn.pset_ex(&key, value, millis(ttl))).await?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> bool {
        let key = self.key(key);
        let mut conn = self.conn.clone();
        match self.bounded(conn.exists(&key)).await {
            Ok(found) => found,
            Err(e) => {
                warn!("exists probe failed, reporting absent: {}", e);
                false
            }
        }
    }

    async fn delete(&self, key: &str) -> Result<(), KvStoreError> {
        let key = self.key(key);
        let mut conn = self.conn.clone();
        let _: () = self.bounded(conn.del(&key)).await?;
        Ok(())
    }

    async fn rename(
        &self,
        old_key: &str,
        new_key: &str,
        ttl: Duration,
    ) -> Result<bool, KvStoreError> {
        let old = self.key(old_key);
        let new = self.key(new_key);
        let mut conn = self.conn.clone();
        let status: i64 = self
            .bounded(
                self.rename_script
                    .key(&old)
                    .key(&new)
                    .arg(millis(ttl))
                    .invoke_async(&mut conn),
            )
            .await?;

        match status {
            1 => Ok(true),
            0 => Ok(false),
            -1 => Err(KvStoreError::KeyCollision(new)),
            other => Err(KvStoreError::Unavailable(format!(
                "unknown rename script status {}",
                other
            ))),
        }
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, KvStoreError> {
        let key = self.key(key);
        let mut conn = self.conn.clone();
        // -2: missing key, -1: no expiry
        let remaining: i64 = self.bounded(conn.pttl(&key)).await?;
        Ok(u64::try_from(remaining).ok().map(Duration::from_millis))
    }

    async fn clear(&self) -> Result<(), KvStoreError> {
        let mut conn = self.conn.clone();
        if self.prefix.is_empty() {
            let _: () = self
                .bounded(redis::cmd("FLUSHDB").query_async(&mut conn))
                .await?;
            return Ok(());
        }

        let pattern = scan_pattern(&self.prefix);
        let mut cursor: u64 = 0;
        let mut removed = 0usize;
        loop {
            let (next, keys): (u64, Vec<String>) = self
                .bounded(
                    redis::cmd("SCAN")
                        .arg(cursor)
                        .arg("MATCH")
                        .arg(&pattern)
                        .arg("COUNT")
                        .arg(SCAN_BATCH)
                        .query_async(&mut conn),
                )
                .await?;
            if !keys.is_empty() {
                removed += keys.len();
                let _: () = self
                    .bounded(redis::cmd("UNLINK").arg(&keys).query_async(&mut conn))
                    .await?;
            }
            if next == 0 {
                break;
            }
            cursor = next;
        }
        info!("cleared {} key(s) under prefix {}", removed, self.prefix);
        Ok(())
    }
}
