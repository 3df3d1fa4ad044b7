//! Configuration loading.
//!
//! # Configuration Sources
//!
//! Later sources override earlier ones:
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.claude-simple-status/config.toml`
//! 3. **`STATUSLINE_CONFIG`** - explicit path, replaces the user config location

use std::fs;
use std::path::{Path, PathBuf};

use statusline_paths::StatusPaths;
use tracing::warn;

use crate::errors::ConfigError;
use crate::types::StatusConfig;
use crate::validation::validate_config;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "STATUSLINE_CONFIG";

/// Resolve which config file to read. `None` when no explicit path is set
/// and the home directory is unknown.
pub fn config_path(paths: &StatusPaths) -> Option<PathBuf> {
    match std::env::var_os(CONFIG_PATH_ENV) {
        Some(path) if !path.is_empty() => Some(PathBuf::from(path)),
        _ => paths.user_config(),
    }
}

/// Load and validate the configuration.
///
/// A missing file is not an error and yields defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read, parsed, or validated.
pub fn load(paths: &StatusPaths) -> Result<StatusConfig, ConfigError> {
    let Some(path) = config_path(paths) else {
        return Ok(StatusConfig::default());
    };
    let config = match load_config_file(&path) {
        Ok(config) => config,
        Err(ConfigError::IoError { source }) if source.kind() == std::io::ErrorKind::NotFound => {
            StatusConfig::default()
        }
        Err(e) => return Err(e),
    };

    validate_config(&config)?;
    Ok(config)
}

/// Load configuration, falling back to defaults on any error.
///
/// The renderer must never fail because of a bad config file, so problems are
/// logged as `config.load_failed` and otherwise ignored.
pub fn load_or_default(paths: &StatusPaths) -> StatusConfig {
    match load(paths) {
        Ok(config) => config,
        Err(e) => {
            warn!(
                event = "config.load_failed",
                path = ?config_path(paths),
                error = %e
            );
            StatusConfig::default()
        }
    }
}

fn load_config_file(path: &Path) -> Result<StatusConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| ConfigError::ConfigParseError {
        message: format!("'{}': {}", path.display(), e),
    })
}
