//! File-backed quota snapshot with an mtime-derived age.
//!
//! The cache file is the only channel between the detached fetch worker
//! (sole writer) and the foreground renderer (reader). Readers fail soft:
//! a missing or malformed file is simply "no snapshot".

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info};

use super::errors::CacheError;
use super::types::QuotaSnapshot;

/// Age of a file since its last modification.
///
/// Returns `None` ("infinitely old") if the file does not exist or its
/// metadata cannot be read. A modification time in the future counts as age
/// zero.
pub(crate) fn file_age(path: &Path) -> Option<Duration> {
    let modified = fs::metadata(path).and_then(|m| m.modified()).ok()?;
    Some(modified.elapsed().unwrap_or(Duration::ZERO))
}

#[derive(Debug, Clone)]
pub struct QuotaCache {
    path: PathBuf,
}

impl QuotaCache {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the cached snapshot. Missing or malformed storage yields `None`.
    pub fn read(&self) -> Option<QuotaSnapshot> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                debug!(
                    event = "core.quota_cache.read_missing",
                    path = %self.path.display(),
                    error = %e
                );
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                debug!(
                    event = "core.quota_cache.read_malformed",
                    path = %self.path.display(),
                    error = %e
                );
                None
            }
        }
    }

    /// Time since the last write, `None` if never written.
    pub fn age(&self) -> Option<Duration> {
        file_age(&self.path)
    }

    /// Atomically replace the cached payload.
    ///
    /// Writes to a temp file in the same directory and renames it over the
    /// cache file, so concurrent readers see either the old or the new body.
    /// Only the fetch worker calls this.
    pub fn write(&self, body: &str) -> Result<(), CacheError> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let write_failed = |message: String| CacheError::WriteFailed {
            path: self.path.clone(),
            message,
        };

        let mut temp =
            tempfile::NamedTempFile::new_in(dir).map_err(|e| write_failed(e.to_string()))?;
        temp.write_all(body.as_bytes())
            .map_err(|e| write_failed(e.to_string()))?;
        temp.persist(&self.path)
            .map_err(|e| write_failed(e.error.to_string()))?;

        info!(
            event = "core.quota_cache.written",
            path = %self.path.display(),
            bytes = body.len()
        );
        Ok(())
    }
}
