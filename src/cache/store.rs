//! CacheStore port - abstraction over cached artifact storage
//!
//! This trait lets the pipeline populate and consult the cache without
//! depending on a concrete implementation (disk, in-memory mock).

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::site::AssetLocation;

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache operation errors
#[derive(Debug, Error)]
pub enum CacheError {
    /// Entry not present; a reader racing a purge lands here too
    #[error("cache entry not found: {0}")]
    NotFound(PathBuf),

    /// I/O failure underneath the store
    #[error("cache I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CacheError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheError::NotFound(_))
    }
}

/// Identity of one cached artifact: the source tree position it mirrors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Source directory relative to the docroot; empty for root-level assets
    pub relative_dir: String,

    /// Artifact filename, identical to the source basename
    pub filename: String,
}

impl CacheKey {
    pub fn new(relative_dir: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            relative_dir: relative_dir.into(),
            filename: filename.into(),
        }
    }

    /// Key for an asset at the given location
    pub fn from_location(location: &AssetLocation) -> Self {
        Self::new(location.relative_dir.clone(), location.filename.clone())
    }

    /// Path of the artifact relative to the cache root
    pub fn relative_path(&self) -> PathBuf {
        if self.relative_dir.is_empty() {
            PathBuf::from(&self.filename)
        } else {
            PathBuf::from(&self.relative_dir).join(&self.filename)
        }
    }

    /// URL tail of the artifact relative to the cache base URL
    pub fn relative_url(&self) -> String {
        if self.relative_dir.is_empty() {
            self.filename.clone()
        } else {
            format!("{}/{}", self.relative_dir, self.filename)
        }
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.relative_url())
    }
}

/// One entry a purge could not remove.
#[derive(Debug, Clone, Serialize)]
pub struct PurgeFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Outcome of a purge. Partial failure is reported, never swallowed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PurgeReport {
    pub removed_files: usize,
    pub removed_dirs: usize,
    pub failures: Vec<PurgeFailure>,
}

impl PurgeReport {
    /// True when nothing was left behind
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Abstract cached artifact store
///
/// Implementations:
/// - `DiskCache` - artifacts under the uploads directory
/// - `MemoryCache` - in-memory for testing
pub trait CacheStore {
    /// Whether an artifact exists for this key
    fn exists(&self, key: &CacheKey) -> bool;

    /// Read an artifact; `NotFound` when absent
    fn read(&self, key: &CacheKey) -> CacheResult<Vec<u8>>;

    /// Write an artifact, creating intermediate directories as needed.
    /// Racing writers are acceptable; last writer wins.
    fn write(&self, key: &CacheKey, content: &[u8]) -> CacheResult<()>;

    /// Recursively create a directory under the cache root; idempotent.
    /// An empty `relative_dir` creates the root itself.
    fn ensure_dir(&self, relative_dir: &str) -> CacheResult<()>;

    /// Recursively delete everything under the cache root, then the root.
    /// Entries deleted concurrently by another purge are not failures.
    fn purge(&self) -> CacheResult<PurgeReport>;

    /// Probe whether artifacts can actually be written
    fn is_writable(&self) -> bool;
}

/// In-memory cache store for testing.
///
/// Uses `Arc<Mutex<>>` internally so it can be cloned and shared.
#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct MemoryCache {
    entries: std::sync::Arc<std::sync::Mutex<std::collections::BTreeMap<PathBuf, Vec<u8>>>>,
    fail_writes: bool,
    unwritable: bool,
}

#[cfg(test)]
impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache whose writes fail with an I/O error
    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    /// A cache that reports itself unwritable
    pub fn unwritable() -> Self {
        Self {
            unwritable: true,
            ..Self::default()
        }
    }

    pub fn entry_count(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

#[cfg(test)]
impl CacheStore for MemoryCache {
    fn exists(&self, key: &CacheKey) -> bool {
        self.entries.lock().unwrap().contains_key(&key.relative_path())
    }

    fn read(&self, key: &CacheKey) -> CacheResult<Vec<u8>> {
        self.entries
            .lock()
            .unwrap()
            .get(&key.relative_path())
            .cloned()
            .ok_or_else(|| CacheError::NotFound(key.relative_path()))
    }

    fn write(&self, key: &CacheKey, content: &[u8]) -> CacheResult<()> {
        if self.fail_writes {
            return Err(CacheError::Io {
                path: key.relative_path(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "write refused"),
            });
        }
        self.entries
            .lock()
            .unwrap()
            .insert(key.relative_path(), content.to_vec());
        Ok(())
    }

    fn ensure_dir(&self, _relative_dir: &str) -> CacheResult<()> {
        Ok(())
    }

    fn purge(&self) -> CacheResult<PurgeReport> {
        let mut entries = self.entries.lock().unwrap();
        let report = PurgeReport {
            removed_files: entries.len(),
            removed_dirs: 0,
            failures: Vec::new(),
        };
        entries.clear();
        Ok(report)
    }

    fn is_writable(&self) -> bool {
        !self.unwritable && !self.fail_writes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_relative_path_handles_empty_dir() {
        let key = CacheKey::new("", "app.js");
        assert_eq!(key.relative_path(), PathBuf::from("app.js"));
        assert_eq!(key.relative_url(), "app.js");

        let key = CacheKey::new("themes/shop/js", "app.js");
        assert_eq!(key.relative_path(), PathBuf::from("themes/shop/js/app.js"));
        assert_eq!(key.relative_url(), "themes/shop/js/app.js");
    }

    #[test]
    fn memory_cache_roundtrip() {
        let cache = MemoryCache::new();
        let key = CacheKey::new("js", "app.js");

        assert!(!cache.exists(&key));
        assert!(cache.read(&key).unwrap_err().is_not_found());

        cache.write(&key, b"packed").unwrap();
        assert!(cache.exists(&key));
        assert_eq!(cache.read(&key).unwrap(), b"packed");
    }

    #[test]
    fn memory_cache_purge_clears_entries() {
        let cache = MemoryCache::new();
        cache.write(&CacheKey::new("js", "a.js"), b"a").unwrap();
        cache.write(&CacheKey::new("js", "b.js"), b"b").unwrap();

        let report = cache.purge().unwrap();
        assert_eq!(report.removed_files, 2);
        assert!(report.is_clean());
        assert!(!cache.exists(&CacheKey::new("js", "a.js")));
    }
}
