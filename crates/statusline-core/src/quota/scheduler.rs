//! Per-invocation refresh decision.

use std::time::Duration;

use tracing::{debug, warn};

use super::launcher::FetchLauncher;
use super::lock::RefreshLock;

/// Thresholds governing when a refresh is attempted.
#[derive(Debug, Clone, Copy)]
pub struct RefreshPolicy {
    /// Cache age below which no refresh is attempted.
    pub fresh_after: Duration,
    /// Lock age beyond which its holder is presumed dead.
    pub lock_stale_after: Duration,
}

impl RefreshPolicy {
    /// A refresh is due when there is no usable snapshot or it has aged past
    /// the fresh threshold.
    pub fn needs_refresh(&self, snapshot_present: bool, cache_age: Option<Duration>) -> bool {
        match cache_age {
            Some(age) if snapshot_present => age >= self.fresh_after,
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshDecision {
    /// No bearer token: quota display is disabled.
    NoToken,
    /// Cache is young enough.
    Fresh,
    /// Another invocation holds the lock and will write the cache.
    LockBusy,
    /// This invocation won the lock and started a worker.
    Launched,
    /// The worker could not be started; the lock was given back.
    LaunchFailed,
}

pub struct RefreshScheduler<'a> {
    lock: &'a RefreshLock,
    launcher: &'a dyn FetchLauncher,
    policy: RefreshPolicy,
}

impl<'a> RefreshScheduler<'a> {
    pub fn new(
        lock: &'a RefreshLock,
        launcher: &'a dyn FetchLauncher,
        policy: RefreshPolicy,
    ) -> Self {
        Self {
            lock,
            launcher,
            policy,
        }
    }

    /// Launch a background fetch if one is due and nobody else is running it.
    ///
    /// Never waits for the fetch. Among many concurrent callers within one
    /// staleness window, only the one that wins the lock launches a worker.
    pub fn maybe_refresh(
        &self,
        token: Option<&str>,
        snapshot_present: bool,
        cache_age: Option<Duration>,
    ) -> RefreshDecision {
        let Some(token) = token else {
            return RefreshDecision::NoToken;
        };

        self.lock.force_release_if_stale(self.policy.lock_stale_after);

        if !self.policy.needs_refresh(snapshot_present, cache_age) {
            debug!(
                event = "core.refresh.skipped_fresh",
                age_secs = cache_age.map(|a| a.as_secs())
            );
            return RefreshDecision::Fresh;
        }

        if !self.lock.try_acquire() {
            return RefreshDecision::LockBusy;
        }

        match self.launcher.launch(token) {
            Ok(()) => RefreshDecision::Launched,
            Err(e) => {
                warn!(event = "core.refresh.launch_failed", error = %e);
                if let Err(e) = self.lock.release() {
                    warn!(event = "core.refresh.lock_release_failed", error = %e);
                }
                RefreshDecision::LaunchFailed
            }
        }
    }
}
