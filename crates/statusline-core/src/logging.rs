//! Structured logging setup.
//!
//! The host displays stdout verbatim and may surface stderr, so nothing is
//! logged unless asked for:
//! - `verbose`: JSON events on stderr, filtered by `RUST_LOG` (default `info`).
//! - `STATUSLINE_LOG=1|true`: JSON events appended to the debug log in the
//!   temp dir; any other value is used as the log file path. The detached
//!   fetch worker inherits this variable.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Environment variable enabling file logging.
pub const LOG_ENV: &str = "STATUSLINE_LOG";

/// Where file logging should go, if enabled.
pub fn log_file_target(setting: Option<&str>, default_path: &Path) -> Option<PathBuf> {
    match setting {
        None | Some("") | Some("0") | Some("false") => None,
        Some("1") | Some("true") => Some(default_path.to_path_buf()),
        Some(path) => Some(PathBuf::from(path)),
    }
}

pub fn init_logging(verbose: bool, default_log_path: &Path) {
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if verbose {
        let layer = fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(false);
        let _ = tracing_subscriber::registry()
            .with(layer.with_filter(filter()))
            .try_init();
        return;
    }

    let setting = std::env::var(LOG_ENV).ok();
    let Some(log_path) = log_file_target(setting.as_deref(), default_log_path) else {
        return;
    };

    let Ok(file) = OpenOptions::new().create(true).append(true).open(&log_path) else {
        return;
    };

    let layer = fmt::layer()
        .json()
        .with_writer(Mutex::new(file))
        .with_target(false);
    let _ = tracing_subscriber::registry()
        .with(layer.with_filter(filter()))
        .try_init();
}
