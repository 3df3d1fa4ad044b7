//! Configuration types.
//!
//! Every field is optional in the TOML file. Accessors resolve the built-in
//! default so callers never deal with `Option` directly.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_USAGE_ENDPOINT: &str = "https://api.anthropic.com/api/oauth/usage";
pub const DEFAULT_FRESH_AFTER_SECS: u64 = 120;
pub const DEFAULT_STALE_AFTER_SECS: u64 = 300;
pub const DEFAULT_LOCK_STALE_AFTER_SECS: u64 = 30;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_ERROR_LOG_CAPACITY: usize = 50;
pub const DEFAULT_BRANCH_CACHE_TTL_SECS: u64 = 30;
pub const DEFAULT_GIT_COMMAND_TIMEOUT_MS: u64 = 1000;

/// Top-level statusline configuration (`~/.claude-simple-status/config.toml`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusConfig {
    #[serde(default)]
    pub quota: QuotaConfig,
    #[serde(default)]
    pub git: GitConfig,
}

/// `[quota]` section: usage endpoint and refresh-cache policy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuotaConfig {
    pub endpoint: Option<String>,
    /// Cache age below which no refresh is attempted.
    pub fresh_after_secs: Option<u64>,
    /// Cache age at which cached numbers are replaced by placeholders.
    pub stale_after_secs: Option<u64>,
    /// Lock age beyond which its holder is presumed dead.
    pub lock_stale_after_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    /// Number of entries retained in the rotating error log.
    pub error_log_capacity: Option<usize>,
}

impl QuotaConfig {
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(DEFAULT_USAGE_ENDPOINT)
    }

    pub fn fresh_after(&self) -> Duration {
        Duration::from_secs(self.fresh_after_secs.unwrap_or(DEFAULT_FRESH_AFTER_SECS))
    }

    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_secs.unwrap_or(DEFAULT_STALE_AFTER_SECS))
    }

    pub fn lock_stale_after(&self) -> Duration {
        Duration::from_secs(
            self.lock_stale_after_secs
                .unwrap_or(DEFAULT_LOCK_STALE_AFTER_SECS),
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    pub fn error_log_capacity(&self) -> usize {
        self.error_log_capacity.unwrap_or(DEFAULT_ERROR_LOG_CAPACITY)
    }
}

/// `[git]` section: branch lookup behavior.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitConfig {
    pub enabled: Option<bool>,
    pub branch_cache_ttl_secs: Option<u64>,
    pub command_timeout_ms: Option<u64>,
}

impl GitConfig {
    pub fn enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    pub fn branch_cache_ttl(&self) -> Duration {
        Duration::from_secs(
            self.branch_cache_ttl_secs
                .unwrap_or(DEFAULT_BRANCH_CACHE_TTL_SECS),
        )
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(
            self.command_timeout_ms
                .unwrap_or(DEFAULT_GIT_COMMAND_TIMEOUT_MS),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_quota_policy() {
        let config = StatusConfig::default();
        assert_eq!(config.quota.endpoint(), DEFAULT_USAGE_ENDPOINT);
        assert_eq!(config.quota.fresh_after(), Duration::from_secs(120));
        assert_eq!(config.quota.stale_after(), Duration::from_secs(300));
        assert_eq!(config.quota.lock_stale_after(), Duration::from_secs(30));
        assert_eq!(config.quota.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.quota.error_log_capacity(), 50);
    }

    #[test]
    fn test_default_git_settings() {
        let config = StatusConfig::default();
        assert!(config.git.enabled());
        assert_eq!(config.git.branch_cache_ttl(), Duration::from_secs(30));
        assert_eq!(config.git.command_timeout(), Duration::from_millis(1000));
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config: StatusConfig = toml::from_str(
            r#"
[quota]
fresh_after_secs = 60
"#,
        )
        .unwrap();
        assert_eq!(config.quota.fresh_after(), Duration::from_secs(60));
        assert_eq!(config.quota.stale_after(), Duration::from_secs(300));
        assert!(config.git.enabled());
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config: StatusConfig = toml::from_str("").unwrap();
        assert!(config.quota.endpoint.is_none());
        assert!(config.git.enabled.is_none());
    }
}
