//! On-disk response cache.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::warn;

use crate::{ResponseCache, compute_pk};

/// Content-addressed file cache.
///
/// Each entry is stored as `{pk}.xml` under the cache directory, where the
/// pk is derived from the key parts with [`compute_pk`]. Unreadable or
/// missing files are cache misses; write failures are logged and dropped,
/// which degrades the cache to a pass-through rather than failing the call.
#[derive(Debug)]
pub struct DiskCache {
    cache_dir: PathBuf,
}

impl DiskCache {
    /// Open (and create if needed) a cache rooted at `dir`.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let cache_dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&cache_dir)
            .with_context(|| format!("Failed to create cache directory {}", cache_dir.display()))?;
        Ok(Self { cache_dir })
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn file_path(&self, key: &[String]) -> PathBuf {
        self.cache_dir.join(format!("{}.xml", compute_pk(key)))
    }
}

impl ResponseCache for DiskCache {
    fn get(&self, key: &[String]) -> Option<Vec<u8>> {
        fs::read(self.file_path(key)).ok()
    }

    fn set(&self, key: &[String], value: &[u8]) {
        let path = self.file_path(key);
        if let Err(e) = fs::write(&path, value) {
            warn!(path = %path.display(), error = %e, "Failed to write cache entry");
        }
    }

    fn kind(&self) -> &'static str {
        "disk"
    }
}
