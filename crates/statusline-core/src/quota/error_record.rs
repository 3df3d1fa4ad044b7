//! Last-error marker plus a bounded rotating log of fetch failures.
//!
//! Written only by the fetch worker. The renderer reads the marker solely to
//! decide whether to show an error indicator; log content is never parsed.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use chrono::Utc;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct ErrorRecord {
    last_error: PathBuf,
    log: PathBuf,
    capacity: usize,
}

impl ErrorRecord {
    pub fn new(last_error: PathBuf, log: PathBuf, capacity: usize) -> Self {
        Self {
            last_error,
            log,
            capacity: capacity.max(1),
        }
    }

    /// Record a failure: append a timestamped log line, set the last-error
    /// marker, then trim the log to the most recent `capacity` entries.
    ///
    /// Best-effort; filesystem failures are logged and swallowed.
    pub fn record(&self, message: &str) {
        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S");
        let line = format!("[{}] {}\n", timestamp, message);

        let appended = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log)
            .and_then(|mut file| file.write_all(line.as_bytes()));
        if let Err(e) = appended {
            warn!(event = "core.error_record.append_failed", path = %self.log.display(), error = %e);
        }

        if let Err(e) = fs::write(&self.last_error, message) {
            warn!(
                event = "core.error_record.marker_write_failed",
                path = %self.last_error.display(),
                error = %e
            );
        }

        self.trim();
    }

    /// Clear the last-error marker. The log is kept for later inspection.
    pub fn clear(&self) {
        if let Err(e) = fs::write(&self.last_error, "") {
            warn!(
                event = "core.error_record.clear_failed",
                path = %self.last_error.display(),
                error = %e
            );
        }
    }

    /// Whether the last fetch attempt that reached a verdict failed.
    pub fn has_error(&self) -> bool {
        fs::read_to_string(&self.last_error)
            .map(|content| !content.trim().is_empty())
            .unwrap_or(false)
    }

    /// Log entries, oldest first. Missing log yields an empty list.
    pub fn entries(&self) -> Vec<String> {
        fs::read_to_string(&self.log)
            .map(|content| {
                content
                    .lines()
                    .filter(|line| !line.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn trim(&self) {
        let entries = self.entries();
        if entries.len() <= self.capacity {
            return;
        }

        let kept = &entries[entries.len() - self.capacity..];
        let mut content = kept.join("\n");
        content.push('\n');
        if let Err(e) = fs::write(&self.log, content) {
            warn!(event = "core.error_record.trim_failed", path = %self.log.display(), error = %e);
        }
    }
}
