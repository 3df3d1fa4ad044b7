//! # statusline-config
//!
//! TOML configuration types, loading, and validation for the statusline.
//!
//! Depends only on `statusline-paths`.

mod loading;
mod validation;

pub mod errors;
pub mod types;

// Public API re-exports
pub use errors::ConfigError;
pub use loading::{CONFIG_PATH_ENV, config_path};
pub use types::{GitConfig, QuotaConfig, StatusConfig};
pub use validation::validate_config;

use statusline_paths::StatusPaths;

impl StatusConfig {
    /// Load configuration from defaults and the user config file.
    ///
    /// See [`loading::load`] for details.
    pub fn load(paths: &StatusPaths) -> Result<Self, ConfigError> {
        loading::load(paths)
    }

    /// Load configuration, never failing.
    ///
    /// Parse and validation failures warn and fall back to defaults.
    pub fn load_or_default(paths: &StatusPaths) -> Self {
        loading::load_or_default(paths)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validation::validate_config(self)
    }
}
