//! On-disk cache backend.
//!
//! One JSON file per key under the cache directory. Each file records the
//! original key, the time it was written and its TTL; expired files are deleted
//! when read.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{matches_pattern, CacheBackend};
use crate::error_handling::CacheError;

#[derive(Debug, Serialize, Deserialize)]
struct FileCacheEntry {
    key: String,
    value: String,
    cached_at: SystemTime,
    ttl_secs: u64,
}

impl FileCacheEntry {
    fn is_expired(&self) -> bool {
        let age = self.cached_at.elapsed().unwrap_or_default();
        age.as_secs() >= self.ttl_secs
    }
}

/// File-backed cache shared between process runs.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    /// Opens (and creates if needed) a cache rooted at `dir`.
    pub fn new(dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.json", file_name))
    }

    async fn read_entry(path: &Path) -> Result<Option<FileCacheEntry>, CacheError> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn remove_file(path: &Path) -> Result<bool, CacheError> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl CacheBackend for FileCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let path = self.path_for(key);
        let Some(entry) = Self::read_entry(&path).await? else {
            return Ok(None);
        };

        // Sanitized file names can collide; the stored key is authoritative
        if entry.key != key {
            return Ok(None);
        }

        if entry.is_expired() {
            Self::remove_file(&path).await?;
            return Ok(None);
        }

        Ok(Some(entry.value))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let entry = FileCacheEntry {
            key: key.to_string(),
            value,
            cached_at: SystemTime::now(),
            ttl_secs: ttl.as_secs(),
        };
        let content = serde_json::to_string(&entry)?;
        tokio::fs::write(self.path_for(key), content).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        Self::remove_file(&self.path_for(key)).await
    }

    async fn clear(&self, pattern: &str) -> Result<usize, CacheError> {
        let mut removed = 0;
        let mut dir = tokio::fs::read_dir(&self.dir).await?;

        while let Some(item) = dir.next_entry().await? {
            let path = item.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let entry = match Self::read_entry(&path).await {
                Ok(Some(entry)) => entry,
                Ok(None) => continue,
                Err(e) => {
                    log::debug!("Skipping unreadable cache file {}: {}", path.display(), e);
                    continue;
                }
            };
            if matches_pattern(pattern, &entry.key) && Self::remove_file(&path).await? {
                removed += 1;
            }
        }

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip_survives_new_instance() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path()).unwrap();
        cache
            .set("whois:example.com", "{\"registrar\":\"X\"}".into(), Duration::from_secs(3600))
            .await
            .unwrap();

        let reopened = FileCache::new(dir.path()).unwrap();
        assert_eq!(
            reopened.get("whois:example.com").await.unwrap().as_deref(),
            Some("{\"registrar\":\"X\"}")
        );
    }

    #[tokio::test]
    async fn test_expired_file_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path()).unwrap();
        cache
            .set("dns:example.com", "1".into(), Duration::from_secs(0))
            .await
            .unwrap();

        assert!(cache.get("dns:example.com").await.unwrap().is_none());
        assert!(!cache.path_for("dns:example.com").exists());
    }

    #[tokio::test]
    async fn test_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path()).unwrap();
        assert!(cache.get("ssl:nowhere.com").await.unwrap().is_none());
        assert!(!cache.delete("ssl:nowhere.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_clear_matches_original_keys() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path()).unwrap();
        let ttl = Duration::from_secs(60);
        cache.set("dns:a.com", "1".into(), ttl).await.unwrap();
        cache.set("seo:a.com", "2".into(), ttl).await.unwrap();
        cache.set("dns:b.com", "3".into(), ttl).await.unwrap();

        assert_eq!(cache.clear("*:a.com").await.unwrap(), 2);
        assert!(cache.get("dns:a.com").await.unwrap().is_none());
        assert_eq!(cache.get("dns:b.com").await.unwrap().as_deref(), Some("3"));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error_not_a_panic() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path()).unwrap();
        std::fs::write(cache.path_for("dns:example.com"), "garbage").unwrap();
        assert!(matches!(
            cache.get("dns:example.com").await,
            Err(CacheError::Serialization(_))
        ));
    }
}
