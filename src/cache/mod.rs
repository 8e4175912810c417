//! Collector result caching.
//!
//! Collector calls are memoized per `"{category}:{domain}"` key with a
//! category-specific TTL. Backends store serialized JSON strings; the
//! [`remember`] combinator handles (de)serialization and never caches errors.
//!
//! There is no single-flight guarantee: two concurrent misses for the same key
//! both run the producer and the last write wins.

mod file;
mod memory;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error_handling::{CacheError, CollectorError};

pub use file::FileCache;
pub use memory::MemoryCache;

/// Key-value store with per-entry TTL.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Returns the value if present and not expired.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Stores a value, replacing any previous entry.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    /// Removes a key. Returns whether an entry existed.
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;

    /// Removes every key matching a glob pattern (`*` matches any run of
    /// characters). Returns the number of entries removed.
    async fn clear(&self, pattern: &str) -> Result<usize, CacheError>;
}

/// Backend that stores nothing. Every `remember` call runs its producer.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

#[async_trait]
impl CacheBackend for NoCache {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), CacheError> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<bool, CacheError> {
        Ok(false)
    }

    async fn clear(&self, _pattern: &str) -> Result<usize, CacheError> {
        Ok(0)
    }
}

/// Builds the cache key for a collector category and domain.
pub fn cache_key(category: &str, domain: &str) -> String {
    format!("{}:{}", category, domain)
}

/// Get-or-compute through the cache.
///
/// On a hit the cached JSON is deserialized and returned. On a miss (or an
/// undecodable entry) `producer` runs; a successful value is written back with
/// `ttl`, an error is returned as-is and not cached. Cache read/write failures
/// are logged and treated as misses.
pub async fn remember<T, F, Fut>(
    cache: &dyn CacheBackend,
    key: &str,
    ttl: Duration,
    producer: F,
) -> Result<T, CollectorError>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, CollectorError>>,
{
    match cache.get(key).await {
        Ok(Some(raw)) => match serde_json::from_str::<T>(&raw) {
            Ok(value) => {
                log::debug!("Cache hit for {}", key);
                return Ok(value);
            }
            Err(e) => log::debug!("Discarding undecodable cache entry {}: {}", key, e),
        },
        Ok(None) => log::debug!("Cache miss for {}", key),
        Err(e) => log::warn!("Cache read failed for {}: {}", key, e),
    }

    let value = producer().await?;

    match serde_json::to_string(&value) {
        Ok(raw) => {
            if let Err(e) = cache.set(key, raw, ttl).await {
                log::warn!("Cache write failed for {}: {}", key, e);
            }
        }
        Err(e) => log::warn!("Failed to serialize {} for caching: {}", key, e),
    }

    Ok(value)
}

/// Glob match supporting `*` only.
pub(crate) fn matches_pattern(pattern: &str, key: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return pattern == key;
    }

    let first = parts[0];
    let last = parts[parts.len() - 1];
    if !key.starts_with(first) || key.len() < first.len() + last.len() {
        return false;
    }

    let mut rest = &key[first.len()..];
    for part in &parts[1..parts.len() - 1] {
        match rest.find(part) {
            Some(idx) => rest = &rest[idx + part.len()..],
            None => return false,
        }
    }
    rest.ends_with(last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_cache_key() {
        assert_eq!(cache_key("dns", "example.com"), "dns:example.com");
    }

    #[test]
    fn test_matches_pattern() {
        assert!(matches_pattern("dns:example.com", "dns:example.com"));
        assert!(!matches_pattern("dns:example.com", "dns:example.org"));
        assert!(matches_pattern("*", "anything"));
        assert!(matches_pattern("*:example.com", "whois:example.com"));
        assert!(!matches_pattern("*:example.com", "whois:sub.example.com.evil"));
        assert!(matches_pattern("dns:*", "dns:example.com"));
        assert!(matches_pattern("s*:*.com", "ssl:example.com"));
        assert!(!matches_pattern("seo:*", "dns:example.com"));
        assert!(!matches_pattern("ab*ba", "aba"));
    }

    #[tokio::test]
    async fn test_remember_caches_success() {
        let cache = MemoryCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value: Vec<String> = remember(&cache, "dns:example.com", Duration::from_secs(60), || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(vec!["93.184.216.34".to_string()])
            })
            .await
            .unwrap();
            assert_eq!(value, vec!["93.184.216.34".to_string()]);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_remember_does_not_cache_errors() {
        let cache = MemoryCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let result: Result<u32, _> = remember(&cache, "ssl:example.com", Duration::from_secs(60), || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(CollectorError::network("connection refused"))
            })
            .await;
            assert_eq!(result, Err(CollectorError::network("connection refused")));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(cache.get("ssl:example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remember_recomputes_on_undecodable_entry() {
        let cache = MemoryCache::new();
        cache
            .set("seo:example.com", "not json".into(), Duration::from_secs(60))
            .await
            .unwrap();

        let value: u32 = remember(&cache, "seo:example.com", Duration::from_secs(60), || async {
            Ok(42)
        })
        .await
        .unwrap();

        assert_eq!(value, 42);
        assert_eq!(
            cache.get("seo:example.com").await.unwrap().as_deref(),
            Some("42")
        );
    }

    #[tokio::test]
    async fn test_remember_with_no_cache_always_runs_producer() {
        let calls = AtomicUsize::new(0);
        for _ in 0..2 {
            let _: u32 = remember(&NoCache, "dns:example.com", Duration::from_secs(60), || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(1)
            })
            .await
            .unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
