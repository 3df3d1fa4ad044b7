//! Configuration validation logic.

use std::time::Duration;

use crate::errors::ConfigError;
use crate::types::StatusConfig;

/// Validate a StatusConfig, returning an error if any values are invalid.
///
/// # Validation Rules
///
/// - Endpoint must be an `http://` or `https://` URL
/// - Every duration must be non-zero
/// - The stale threshold cannot be shorter than the fresh threshold
/// - A request must time out before its refresh lock counts as stale
/// - The error log must retain at least one entry
pub fn validate_config(config: &StatusConfig) -> Result<(), ConfigError> {
    let endpoint = config.quota.endpoint();
    if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
        return Err(ConfigError::InvalidConfiguration {
            message: format!("Invalid quota endpoint '{}': must be an http(s) URL", endpoint),
        });
    }

    let durations = [
        ("quota.fresh_after_secs", config.quota.fresh_after()),
        ("quota.stale_after_secs", config.quota.stale_after()),
        ("quota.lock_stale_after_secs", config.quota.lock_stale_after()),
        ("quota.request_timeout_secs", config.quota.request_timeout()),
        ("git.branch_cache_ttl_secs", config.git.branch_cache_ttl()),
        ("git.command_timeout_ms", config.git.command_timeout()),
    ];
    for (name, value) in durations {
        if value == Duration::ZERO {
            return Err(ConfigError::InvalidConfiguration {
                message: format!("{} must be greater than 0", name),
            });
        }
    }

    if config.quota.stale_after() < config.quota.fresh_after() {
        return Err(ConfigError::InvalidConfiguration {
            message: format!(
                "quota.stale_after_secs ({}) must not be less than quota.fresh_after_secs ({})",
                config.quota.stale_after().as_secs(),
                config.quota.fresh_after().as_secs()
            ),
        });
    }

    if config.quota.request_timeout() >= config.quota.lock_stale_after() {
        return Err(ConfigError::InvalidConfiguration {
            message: format!(
                "quota.request_timeout_secs ({}) must be less than quota.lock_stale_after_secs ({})",
                config.quota.request_timeout().as_secs(),
                config.quota.lock_stale_after().as_secs()
            ),
        });
    }

    if config.quota.error_log_capacity() == 0 {
        return Err(ConfigError::InvalidConfiguration {
            message: "quota.error_log_capacity must be at least 1".to_string(),
        });
    }

    Ok(())
}
