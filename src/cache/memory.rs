//! In-process cache backend.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{matches_pattern, CacheBackend};
use crate::error_handling::CacheError;

#[derive(Debug)]
struct Entry {
    value: String,
    expires_at: Instant,
}

/// Map-backed cache, lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired ones included until they are read.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Ok(Some(entry.value.clone()))
                }
                Some(_) => {}
            }
        }

        // Expired: evict under the write lock, re-checking in case of a fresh set
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get(key) {
            if entry.expires_at > Instant::now() {
                return Ok(Some(entry.value.clone()));
            }
            entries.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let entry = Entry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.entries.write().await.remove(key).is_some())
    }

    async fn clear(&self, pattern: &str) -> Result<usize, CacheError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !matches_pattern(pattern, key));
        Ok(before - entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_delete() {
        let cache = MemoryCache::new();
        cache
            .set("dns:example.com", "{}".into(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(
            cache.get("dns:example.com").await.unwrap().as_deref(),
            Some("{}")
        );
        assert!(cache.delete("dns:example.com").await.unwrap());
        assert!(!cache.delete("dns:example.com").await.unwrap());
        assert!(cache.get("dns:example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_is_evicted() {
        let cache = MemoryCache::new();
        cache
            .set("seo:example.com", "1".into(), Duration::from_millis(0))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(cache.get("seo:example.com").await.unwrap().is_none());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_clear_by_pattern() {
        let cache = MemoryCache::new();
        let ttl = Duration::from_secs(60);
        for key in ["dns:a.com", "whois:a.com", "dns:b.com"] {
            cache.set(key, "x".into(), ttl).await.unwrap();
        }

        assert_eq!(cache.clear("*:a.com").await.unwrap(), 2);
        assert_eq!(cache.len().await, 1);
        assert!(cache.get("dns:b.com").await.unwrap().is_some());
    }
}
