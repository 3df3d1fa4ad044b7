//! Current branch name, cached per working directory.
//!
//! Shells out to `git rev-parse --abbrev-ref HEAD` with a bounded timeout and
//! keeps successful answers in a small JSON file for a short TTL so that a
//! high render tick rate does not spawn git on every invocation.

use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Serialize, Deserialize)]
struct BranchEntry {
    branch: String,
    /// Unix epoch milliseconds of the lookup.
    ts: i64,
}

type BranchCacheFile = HashMap<String, BranchEntry>;

#[derive(Debug, Clone)]
pub struct BranchLookup {
    cache_file: PathBuf,
    ttl: Duration,
    timeout: Duration,
}

impl BranchLookup {
    pub fn new(cache_file: PathBuf, ttl: Duration, timeout: Duration) -> Self {
        Self {
            cache_file,
            ttl,
            timeout,
        }
    }

    /// Branch checked out in `cwd`, or `None` outside a repository, on
    /// timeout, or on any git failure.
    pub fn current_branch(&self, cwd: &Path) -> Option<String> {
        let key = cwd.to_string_lossy().into_owned();
        let mut cache = self.read_cache();
        let now_ms = Utc::now().timestamp_millis();

        if let Some(entry) = cache.get(&key)
            && now_ms.saturating_sub(entry.ts)
                < i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX)
        {
            debug!(event = "core.git.branch_cache_hit", cwd = %key);
            return Some(entry.branch.clone());
        }

        let branch = run_rev_parse(cwd, self.timeout)?;
        cache.insert(
            key,
            BranchEntry {
                branch: branch.clone(),
                ts: now_ms,
            },
        );
        self.write_cache(&cache);
        Some(branch)
    }

    fn read_cache(&self) -> BranchCacheFile {
        fs::read_to_string(&self.cache_file)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }

    fn write_cache(&self, cache: &BranchCacheFile) {
        let written = serde_json::to_string(cache)
            .map_err(std::io::Error::other)
            .and_then(|json| fs::write(&self.cache_file, json));
        if let Err(e) = written {
            warn!(
                event = "core.git.branch_cache_write_failed",
                path = %self.cache_file.display(),
                error = %e
            );
        }
    }
}

/// Run `git rev-parse --abbrev-ref HEAD`, killing it if it outlives `timeout`.
fn run_rev_parse(cwd: &Path, timeout: Duration) -> Option<String> {
    let mut child = Command::new("git")
        .current_dir(cwd)
        .args(["rev-parse", "--abbrev-ref", "HEAD"])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| debug!(event = "core.git.spawn_failed", error = %e))
        .ok()?;

    let start = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if start.elapsed() >= timeout => {
                warn!(
                    event = "core.git.rev_parse_timeout",
                    timeout_ms = timeout.as_millis() as u64,
                    cwd = %cwd.display()
                );
                let _ = child.kill();
                let _ = child.wait();
                return None;
            }
            Ok(None) => std::thread::sleep(POLL_INTERVAL),
            Err(e) => {
                warn!(event = "core.git.status_check_failed", error = %e);
                return None;
            }
        }
    };

    if !status.success() {
        debug!(event = "core.git.not_a_repository", cwd = %cwd.display());
        return None;
    }

    let mut stdout = String::new();
    child.stdout.take()?.read_to_string(&mut stdout).ok()?;
    let branch = stdout.trim();
    (!branch.is_empty()).then(|| branch.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn git_available() -> bool {
        Command::new("git")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn git(dir: &Path, args: &[&str]) {
        let status = Command::new("git")
            .current_dir(dir)
            .args(["-c", "user.name=test", "-c", "user.email=test@example.com"])
            .args(args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .unwrap();
        assert!(status.success(), "git {:?} failed", args);
    }

    fn lookup_in(temp: &TempDir, ttl: Duration) -> BranchLookup {
        BranchLookup::new(
            temp.path().join("branches.json"),
            ttl,
            Duration::from_secs(5),
        )
    }

    #[test]
    fn test_reads_branch_from_repository() {
        if !git_available() {
            return;
        }
        let temp = TempDir::new().unwrap();
        let repo = temp.path().join("repo");
        fs::create_dir(&repo).unwrap();
        git(&repo, &["init", "-q"]);
        git(&repo, &["checkout", "-q", "-b", "feature/status"]);
        git(&repo, &["commit", "-q", "--allow-empty", "-m", "init"]);

        let lookup = lookup_in(&temp, Duration::from_secs(30));
        assert_eq!(
            lookup.current_branch(&repo).as_deref(),
            Some("feature/status")
        );

        let cache: BranchCacheFile =
            serde_json::from_str(&fs::read_to_string(temp.path().join("branches.json")).unwrap())
                .unwrap();
        assert_eq!(cache[&*repo.to_string_lossy()].branch, "feature/status");
    }

    #[test]
    fn test_fresh_cache_entry_is_used() {
        let temp = TempDir::new().unwrap();
        let cwd = temp.path().join("anywhere");
        let mut cache = BranchCacheFile::new();
        cache.insert(
            cwd.to_string_lossy().into_owned(),
            BranchEntry {
                branch: "cached-branch".to_string(),
                ts: Utc::now().timestamp_millis(),
            },
        );
        fs::write(
            temp.path().join("branches.json"),
            serde_json::to_string(&cache).unwrap(),
        )
        .unwrap();

        let lookup = lookup_in(&temp, Duration::from_secs(30));
        assert_eq!(lookup.current_branch(&cwd).as_deref(), Some("cached-branch"));
    }

    #[test]
    fn test_huge_ttl_keeps_fresh_entry() {
        let temp = TempDir::new().unwrap();
        let cwd = temp.path().join("not-a-repo");
        let mut cache = BranchCacheFile::new();
        cache.insert(
            cwd.to_string_lossy().into_owned(),
            BranchEntry {
                branch: "pinned".to_string(),
                ts: Utc::now().timestamp_millis(),
            },
        );
        fs::write(
            temp.path().join("branches.json"),
            serde_json::to_string(&cache).unwrap(),
        )
        .unwrap();

        let lookup = lookup_in(&temp, Duration::from_secs(u64::MAX));
        assert_eq!(lookup.current_branch(&cwd).as_deref(), Some("pinned"));
    }

    #[test]
    fn test_expired_cache_entry_is_ignored() {
        let temp = TempDir::new().unwrap();
        let cwd = temp.path().join("missing-dir");
        let mut cache = BranchCacheFile::new();
        cache.insert(
            cwd.to_string_lossy().into_owned(),
            BranchEntry {
                branch: "old-branch".to_string(),
                ts: Utc::now().timestamp_millis() - 60_000,
            },
        );
        fs::write(
            temp.path().join("branches.json"),
            serde_json::to_string(&cache).unwrap(),
        )
        .unwrap();

        let lookup = lookup_in(&temp, Duration::from_secs(30));
        // cwd does not exist, so git cannot even be spawned there
        assert_eq!(lookup.current_branch(&cwd), None);
    }

    #[test]
    fn test_corrupt_cache_file_is_ignored() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("branches.json"), "[broken").unwrap();
        let lookup = lookup_in(&temp, Duration::from_secs(30));
        assert_eq!(lookup.current_branch(&temp.path().join("missing-dir")), None);
    }
}
