//! Cache backends
//!
//! A backend stores opaque string values under fully-qualified keys and remembers which
//! namespace each key was written under, so a whole namespace can be dropped at once
//! without scanning the key space.

use crate::errors::CacheError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Debug;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Storage operations a cache backend must provide
#[async_trait]
pub trait CacheBackend: Send + Sync + Debug {
    /// Fetch a value if present and not expired
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store a value under `key`, tagging it with `namespace`
    async fn set(
        &self,
        namespace: &str,
        key: &str,
        value: String,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError>;

    /// Remove one key. Returns whether anything was removed.
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;

    /// Remove every key tagged with `namespace`. Returns the number removed.
    async fn delete_namespace(&self, namespace: &str) -> Result<u64, CacheError>;
}

#[derive(Debug, Clone)]
struct MemoryEntry {
    namespace: String,
    value: String,
    expires_at: Option<Instant>,
}

impl MemoryEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

/// In-process backend with per-entry TTLs
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, MemoryEntry>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|entry| entry.is_live(now))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone()))
    }

    async fn set(
        &self,
        namespace: &str,
        key: &str,
        value: String,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        // Expired entries are swept on write
        entries.retain(|_, entry| entry.is_live(now));
        entries.insert(
            key.to_string(),
            MemoryEntry {
                namespace: namespace.to_string(),
                value,
                expires_at: ttl.map(|ttl| now + ttl),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.entries.write().await.remove(key).is_some())
    }

    async fn delete_namespace(&self, namespace: &str) -> Result<u64, CacheError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.namespace != namespace);
        Ok((before - entries.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_delete() {
        let backend = MemoryBackend::new();
        backend.set("users", "k1", "v1".to_string(), None).await.unwrap();

        assert_eq!(backend.get("k1").await.unwrap().as_deref(), Some("v1"));
        assert!(backend.delete("k1").await.unwrap());
        assert!(!backend.delete("k1").await.unwrap());
        assert_eq!(backend.get("k1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_namespace_delete_leaves_other_namespaces() {
        let backend = MemoryBackend::new();
        backend.set("users", "u1", "a".to_string(), None).await.unwrap();
        backend.set("users", "u2", "b".to_string(), None).await.unwrap();
        backend.set("pets", "p1", "c".to_string(), None).await.unwrap();

        assert_eq!(backend.delete_namespace("users").await.unwrap(), 2);
        assert_eq!(backend.get("u1").await.unwrap(), None);
        assert_eq!(backend.get("p1").await.unwrap().as_deref(), Some("c"));
    }

    #[tokio::test]
    async fn test_expired_entries_are_not_returned() {
        let backend = MemoryBackend::new();
        backend
            .set("users", "k", "v".to_string(), Some(Duration::from_millis(10)))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(backend.get("k").await.unwrap(), None);
        assert!(backend.is_empty().await);
    }
}
