//! Non-blocking refresh cache for account usage quotas.
//!
//! Per invocation the foreground reads the cached snapshot, asks the
//! [`RefreshScheduler`] whether a detached worker should refresh it, and
//! renders whatever was cached before that decision. The worker
//! ([`run_fetch`]) writes the cache and error record for the *next*
//! invocation and releases the [`RefreshLock`] on every exit path.

pub mod cache;
pub mod error_record;
pub mod errors;
pub mod fetcher;
pub mod launcher;
pub mod lock;
pub mod scheduler;
pub mod staleness;
pub mod types;

pub use cache::QuotaCache;
pub use error_record::ErrorRecord;
pub use errors::{CacheError, FetchError, LaunchError, LockError};
pub use fetcher::{FetchOutcome, HttpUsageSource, UsageResponse, UsageSource, run_fetch};
pub use launcher::{DetachedLauncher, FETCH_TOKEN_ENV, FetchLauncher};
pub use lock::{HeldLock, RefreshLock};
pub use scheduler::{RefreshDecision, RefreshPolicy, RefreshScheduler};
pub use staleness::{QuotaDisplay, QuotaValue, Severity, evaluate};
pub use types::{QuotaSnapshot, QuotaWindow};

use statusline_config::QuotaConfig;
use statusline_paths::StatusPaths;

/// The three filesystem artifacts shared between invocations.
#[derive(Debug, Clone)]
pub struct QuotaStore {
    pub cache: QuotaCache,
    pub lock: RefreshLock,
    pub errors: ErrorRecord,
}

impl QuotaStore {
    pub fn new(paths: &StatusPaths, config: &QuotaConfig) -> Self {
        Self {
            cache: QuotaCache::new(paths.quota_cache()),
            lock: RefreshLock::new(paths.quota_lock()),
            errors: ErrorRecord::new(
                paths.last_error(),
                paths.error_log(),
                config.error_log_capacity(),
            ),
        }
    }
}

impl From<&QuotaConfig> for RefreshPolicy {
    fn from(config: &QuotaConfig) -> Self {
        Self {
            fresh_after: config.fresh_after(),
            lock_stale_after: config.lock_stale_after(),
        }
    }
}

impl From<&QuotaConfig> for HttpUsageSource {
    fn from(config: &QuotaConfig) -> Self {
        HttpUsageSource::new(config.endpoint(), config.request_timeout())
    }
}
