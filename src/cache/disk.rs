//! Disk-backed cache store
//!
//! Artifacts live under the cache root, mirroring the source tree. Writes
//! are atomic (tempfile + rename) so a reader racing a writer sees either
//! the old artifact or the new one, never a torn file.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use super::store::{CacheError, CacheKey, CacheResult, CacheStore, PurgeFailure, PurgeReport};

/// Cache store rooted at a directory on disk
#[derive(Debug, Clone)]
pub struct DiskCache {
    root: PathBuf,
}

impl DiskCache {
    /// Create a store rooted at the given directory; nothing is created
    /// until the first `ensure_dir` or `write`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The cache root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of the artifact for a key
    pub fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.root.join(key.relative_path())
    }

    fn dir_path(&self, relative_dir: &str) -> PathBuf {
        if relative_dir.is_empty() {
            self.root.clone()
        } else {
            self.root.join(relative_dir)
        }
    }

    fn purge_tree(dir: &Path, report: &mut PurgeReport) {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            // another purge got here first
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return,
            Err(e) => {
                report.failures.push(PurgeFailure {
                    path: dir.to_path_buf(),
                    message: e.to_string(),
                });
                return;
            }
        };

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    report.failures.push(PurgeFailure {
                        path: dir.to_path_buf(),
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            let path = entry.path();
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);

            if is_dir {
                Self::purge_tree(&path, report);
                Self::remove(&path, true, report);
            } else {
                Self::remove(&path, false, report);
            }
        }
    }

    fn remove(path: &Path, is_dir: bool, report: &mut PurgeReport) {
        let result = if is_dir {
            std::fs::remove_dir(path)
        } else {
            std::fs::remove_file(path)
        };

        match result {
            Ok(()) => {
                if is_dir {
                    report.removed_dirs += 1;
                } else {
                    report.removed_files += 1;
                }
            }
            // already gone, not a failure
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => report.failures.push(PurgeFailure {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }
}

impl CacheStore for DiskCache {
    fn exists(&self, key: &CacheKey) -> bool {
        self.entry_path(key).is_file()
    }

    fn read(&self, key: &CacheKey) -> CacheResult<Vec<u8>> {
        let path = self.entry_path(key);
        std::fs::read(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CacheError::NotFound(path)
            } else {
                CacheError::Io { path, source: e }
            }
        })
    }

    fn write(&self, key: &CacheKey, content: &[u8]) -> CacheResult<()> {
        let path = self.entry_path(key);
        let parent = path.parent().unwrap_or(&self.root).to_path_buf();

        std::fs::create_dir_all(&parent).map_err(|e| CacheError::Io {
            path: parent.clone(),
            source: e,
        })?;

        let mut tmp = NamedTempFile::new_in(&parent).map_err(|e| CacheError::Io {
            path: parent.clone(),
            source: e,
        })?;

        tmp.write_all(content).map_err(|e| CacheError::Io {
            path: path.clone(),
            source: e,
        })?;

        tmp.persist(&path).map_err(|e| CacheError::Io {
            path,
            source: e.error,
        })?;

        Ok(())
    }

    fn ensure_dir(&self, relative_dir: &str) -> CacheResult<()> {
        let dir = self.dir_path(relative_dir);
        std::fs::create_dir_all(&dir).map_err(|e| CacheError::Io {
            path: dir,
            source: e,
        })
    }

    fn purge(&self) -> CacheResult<PurgeReport> {
        let mut report = PurgeReport::default();

        if !self.root.exists() {
            return Ok(report);
        }

        Self::purge_tree(&self.root, &mut report);
        Self::remove(&self.root, true, &mut report);

        Ok(report)
    }

    fn is_writable(&self) -> bool {
        if !self.root.is_dir() {
            return false;
        }
        NamedTempFile::new_in(&self.root).is_ok()
    }
}
