use tracing::warn;

use statusline_config::{StatusConfig, config_path};
use statusline_core::quota::QuotaStore;
use statusline_paths::StatusPaths;

use crate::color;

/// Paths, configuration and quota store shared by every command.
pub struct Context {
    pub paths: StatusPaths,
    pub config: StatusConfig,
    pub store: QuotaStore,
}

impl Context {
    /// Build the context without writing anything to the terminal. Config
    /// problems are logged and defaults used.
    pub fn load_quiet() -> Self {
        let paths = StatusPaths::resolve();
        let config = StatusConfig::load_or_default(&paths);
        Self::new(paths, config)
    }

    /// Like [`Context::load_quiet`], but also tells the user on stderr when
    /// their config file could not be used.
    pub fn load_with_warning() -> Self {
        let paths = StatusPaths::resolve();
        let config = match StatusConfig::load(&paths) {
            Ok(config) => config,
            Err(e) => {
                eprintln!(
                    "{} Could not load config: {}. Using defaults.",
                    color::error("Warning:"),
                    e
                );
                if let Some(path) = config_path(&paths) {
                    eprintln!(
                        "  {}",
                        color::hint(&format!(
                            "Tip: Check {} for syntax errors.",
                            path.display()
                        ))
                    );
                }
                warn!(
                    event = "cli.config.load_failed",
                    error = %e,
                    "Config load failed, using defaults"
                );
                StatusConfig::default()
            }
        };
        Self::new(paths, config)
    }

    fn new(paths: StatusPaths, config: StatusConfig) -> Self {
        let store = QuotaStore::new(&paths, &config.quota);
        Self {
            paths,
            config,
            store,
        }
    }
}
