use std::path::PathBuf;

use crate::errors::StatusError;

/// Errors from the quota snapshot cache.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Failed to write quota cache '{path}': {message}")]
    WriteFailed { path: PathBuf, message: String },
}

/// Errors from the cross-process refresh lock.
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("Failed to remove lock '{path}': {source}")]
    ReleaseFailed {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Outcome of a failed usage fetch.
///
/// The `Display` output is the human-readable message persisted to the error
/// log, so it is kept short.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP {status}")]
    HttpStatus { status: u16 },

    #[error("Connection failed")]
    Connection { message: String },

    #[error("Timeout")]
    Timeout,

    #[error("Invalid JSON")]
    InvalidBody { message: String },

    #[error("HTTP client init failed: {message}")]
    ClientInit { message: String },

    #[error("Cache write failed: {source}")]
    CacheWrite {
        #[from]
        source: CacheError,
    },
}

/// Errors from launching the detached fetch worker.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("Failed to spawn fetch worker '{program}': {source}")]
    SpawnFailed {
        program: PathBuf,
        source: std::io::Error,
    },

    #[error("Could not determine statusline binary path: {source}")]
    ExecutableNotFound { source: std::io::Error },
}

impl StatusError for CacheError {
    fn error_code(&self) -> &'static str {
        match self {
            CacheError::WriteFailed { .. } => "CACHE_WRITE_FAILED",
        }
    }
}

impl StatusError for LockError {
    fn error_code(&self) -> &'static str {
        match self {
            LockError::ReleaseFailed { .. } => "LOCK_RELEASE_FAILED",
        }
    }
}

impl StatusError for FetchError {
    fn error_code(&self) -> &'static str {
        match self {
            FetchError::HttpStatus { .. } => "FETCH_HTTP_STATUS",
            FetchError::Connection { .. } => "FETCH_CONNECTION_FAILED",
            FetchError::Timeout => "FETCH_TIMEOUT",
            FetchError::InvalidBody { .. } => "FETCH_INVALID_BODY",
            FetchError::ClientInit { .. } => "FETCH_CLIENT_INIT_FAILED",
            FetchError::CacheWrite { .. } => "FETCH_CACHE_WRITE_FAILED",
        }
    }
}

impl StatusError for LaunchError {
    fn error_code(&self) -> &'static str {
        match self {
            LaunchError::SpawnFailed { .. } => "LAUNCH_SPAWN_FAILED",
            LaunchError::ExecutableNotFound { .. } => "LAUNCH_EXECUTABLE_NOT_FOUND",
        }
    }
}
