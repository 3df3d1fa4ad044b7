use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("home directory not found, set the $HOME environment variable")]
    HomeNotFound,
}

/// Centralized path construction for every file the statusline touches.
///
/// Cache, lock and log files live in the process temp directory (not
/// guaranteed to survive a reboot). Credentials and user config live under
/// the home directory, which may be unknown. Use `resolve()` in production
/// code and `from_dirs()` / `from_temp_dir()` in tests.
#[derive(Debug, Clone)]
pub struct StatusPaths {
    temp_dir: PathBuf,
    home_dir: Option<PathBuf>,
}

impl StatusPaths {
    /// Resolve paths from the process temp directory and the user's home.
    ///
    /// Never fails: without a home directory there are no credentials and no
    /// user config, while temp-dir files still resolve.
    pub fn resolve() -> Self {
        Self {
            temp_dir: std::env::temp_dir(),
            home_dir: dirs::home_dir(),
        }
    }

    /// Create paths from explicit base directories. Use in tests.
    pub fn from_dirs(temp_dir: PathBuf, home_dir: PathBuf) -> Self {
        Self {
            temp_dir,
            home_dir: Some(home_dir),
        }
    }

    /// Paths with no known home directory. Use in tests.
    pub fn from_temp_dir(temp_dir: PathBuf) -> Self {
        Self {
            temp_dir,
            home_dir: None,
        }
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    pub fn home_dir(&self) -> Option<&Path> {
        self.home_dir.as_deref()
    }

    // --- Temp-dir scoped cache files ---

    pub fn quota_cache(&self) -> PathBuf {
        self.temp_dir.join("claude-statusline-quota.json")
    }

    pub fn quota_lock(&self) -> PathBuf {
        self.temp_dir.join("claude-statusline-quota.lock")
    }

    pub fn last_error(&self) -> PathBuf {
        self.temp_dir.join("claude-statusline-error")
    }

    pub fn error_log(&self) -> PathBuf {
        self.temp_dir.join("claude-statusline.log")
    }

    pub fn branch_cache(&self) -> PathBuf {
        self.temp_dir.join("claude-statusline-branches.json")
    }

    pub fn debug_log(&self) -> PathBuf {
        self.temp_dir.join("claude-statusline-debug.log")
    }

    // --- Home-dir files ---

    /// OAuth credentials written by the host: `~/.claude/.credentials.json`.
    pub fn credentials(&self) -> Option<PathBuf> {
        Some(self.home_dir()?.join(".claude").join(".credentials.json"))
    }

    pub fn config_dir(&self) -> Option<PathBuf> {
        Some(self.home_dir()?.join(".claude-simple-status"))
    }

    pub fn user_config(&self) -> Option<PathBuf> {
        Some(self.config_dir()?.join("config.toml"))
    }
}
