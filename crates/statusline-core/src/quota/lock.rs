//! Directory-based advisory lock shared by independent processes.
//!
//! `mkdir` either creates the directory or fails because it exists, so two
//! racing processes can never both acquire. A holder that dies without
//! cleaning up is recovered by the next caller once the directory is older
//! than the staleness threshold.
//!
//! Each acquisition stamps an owner token inside the directory. A guard only
//! removes the lock while that token is still the one it adopted, so a holder
//! whose lock was force-released cannot free its successor's lock.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::{debug, info, warn};

use super::cache::file_age;
use super::errors::LockError;

const OWNER_FILE: &str = "owner";

static ACQUISITIONS: AtomicU64 = AtomicU64::new(0);

/// Unique per acquisition, across processes and within one.
fn owner_token() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!(
        "{}-{}-{}",
        std::process::id(),
        nanos,
        ACQUISITIONS.fetch_add(1, Ordering::Relaxed)
    )
}

#[derive(Debug, Clone)]
pub struct RefreshLock {
    path: PathBuf,
}

impl RefreshLock {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_held(&self) -> bool {
        self.path.is_dir()
    }

    /// Time since the lock was taken, `None` if not held.
    pub fn age(&self) -> Option<Duration> {
        file_age(&self.path)
    }

    /// Owner token of the current holder, `None` if not held or unstamped.
    pub fn owner(&self) -> Option<String> {
        fs::read_to_string(self.path.join(OWNER_FILE)).ok()
    }

    /// Try to take the lock. Returns `true` only for the single winner.
    pub fn try_acquire(&self) -> bool {
        match fs::create_dir(&self.path) {
            Ok(()) => {
                if let Err(e) = fs::write(self.path.join(OWNER_FILE), owner_token()) {
                    warn!(
                        event = "core.quota_lock.owner_stamp_failed",
                        path = %self.path.display(),
                        error = %e
                    );
                }
                debug!(event = "core.quota_lock.acquired", path = %self.path.display());
                true
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!(event = "core.quota_lock.busy", path = %self.path.display());
                false
            }
            Err(e) => {
                warn!(
                    event = "core.quota_lock.acquire_failed",
                    path = %self.path.display(),
                    error = %e
                );
                false
            }
        }
    }

    /// Release the lock. Idempotent: an already-missing lock is not an error.
    pub fn release(&self) -> Result<(), LockError> {
        match fs::remove_dir_all(&self.path) {
            Ok(()) => {
                debug!(event = "core.quota_lock.released", path = %self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(LockError::ReleaseFailed {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Release the lock if it has been held longer than `max_age`.
    ///
    /// Returns `true` if a stale lock was removed by this call.
    pub fn force_release_if_stale(&self, max_age: Duration) -> bool {
        let Some(age) = self.age() else {
            return false;
        };
        if age <= max_age {
            return false;
        }

        match self.release() {
            Ok(()) => {
                info!(
                    event = "core.quota_lock.stale_released",
                    path = %self.path.display(),
                    age_secs = age.as_secs()
                );
                true
            }
            Err(e) => {
                warn!(event = "core.quota_lock.stale_release_failed", error = %e);
                false
            }
        }
    }

    /// Take ownership of a lock acquired by another process.
    ///
    /// The fetch worker is spawned after its parent acquired the lock; the
    /// returned guard releases it exactly once when dropped, on every exit
    /// path including unwinding, unless the lock has changed hands since.
    pub fn adopt(&self) -> HeldLock<'_> {
        HeldLock {
            lock: self,
            owner: self.owner(),
            released: false,
        }
    }
}

/// Releases the lock on drop.
#[derive(Debug)]
pub struct HeldLock<'a> {
    lock: &'a RefreshLock,
    owner: Option<String>,
    released: bool,
}

impl HeldLock<'_> {
    pub fn release(mut self) {
        self.release_once();
    }

    fn release_once(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if self.lock.owner() != self.owner {
            warn!(
                event = "core.quota_lock.ownership_lost",
                path = %self.lock.path.display()
            );
            return;
        }
        if let Err(e) = self.lock.release() {
            warn!(event = "core.quota_lock.release_failed", error = %e);
        }
    }
}

impl Drop for HeldLock<'_> {
    fn drop(&mut self) {
        self.release_once();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};
    use tempfile::TempDir;

    fn lock_in(temp: &TempDir) -> RefreshLock {
        RefreshLock::new(temp.path().join("quota.lock"))
    }

    #[test]
    fn test_acquire_and_release() {
        let temp = TempDir::new().unwrap();
        let lock = lock_in(&temp);

        assert!(lock.try_acquire());
        assert!(lock.is_held());
        assert!(!lock.try_acquire(), "second acquire must fail");

        lock.release().unwrap();
        assert!(!lock.is_held());
        assert!(lock.try_acquire(), "acquire after release must succeed");
    }

    #[test]
    fn test_release_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let lock = lock_in(&temp);

        assert!(lock.release().is_ok());
        assert!(lock.try_acquire());
        assert!(lock.release().is_ok());
        assert!(lock.release().is_ok());
    }

    #[test]
    fn test_concurrent_acquire_has_single_winner() {
        const RACERS: usize = 16;

        for _ in 0..20 {
            let temp = TempDir::new().unwrap();
            let lock = lock_in(&temp);
            let barrier = Arc::new(Barrier::new(RACERS));

            let handles: Vec<_> = (0..RACERS)
                .map(|_| {
                    let lock = lock.clone();
                    let barrier = Arc::clone(&barrier);
                    std::thread::spawn(move || {
                        barrier.wait();
                        lock.try_acquire()
                    })
                })
                .collect();

            let winners = handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|won| *won)
                .count();
            assert_eq!(winners, 1);
        }
    }

    #[test]
    fn test_fresh_lock_is_not_force_released() {
        let temp = TempDir::new().unwrap();
        let lock = lock_in(&temp);

        assert!(lock.try_acquire());
        assert!(!lock.force_release_if_stale(Duration::from_secs(30)));
        assert!(lock.is_held());
    }

    #[test]
    fn test_stale_lock_is_force_released_and_reacquirable() {
        let temp = TempDir::new().unwrap();
        let lock = lock_in(&temp);

        assert!(lock.try_acquire());
        std::thread::sleep(Duration::from_millis(20));

        assert!(lock.force_release_if_stale(Duration::from_millis(5)));
        assert!(!lock.is_held());
        assert!(lock.try_acquire());
    }

    #[test]
    fn test_force_release_without_lock_is_noop() {
        let temp = TempDir::new().unwrap();
        assert!(!lock_in(&temp).force_release_if_stale(Duration::ZERO));
    }

    #[test]
    fn test_held_lock_releases_on_drop() {
        let temp = TempDir::new().unwrap();
        let lock = lock_in(&temp);

        assert!(lock.try_acquire());
        {
            let _held = lock.adopt();
        }
        assert!(!lock.is_held());
    }

    #[test]
    fn test_held_lock_releases_on_panic() {
        let temp = TempDir::new().unwrap();
        let lock = lock_in(&temp);
        assert!(lock.try_acquire());

        let result = std::panic::catch_unwind(|| {
            let _held = lock.adopt();
            panic!("worker crashed");
        });

        assert!(result.is_err());
        assert!(!lock.is_held());
    }

    #[test]
    fn test_explicit_release_does_not_touch_a_newer_holder() {
        let temp = TempDir::new().unwrap();
        let lock = lock_in(&temp);
        assert!(lock.try_acquire());

        let held = lock.adopt();
        held.release();
        assert!(!lock.is_held());

        // Another process takes the lock; the consumed guard must not release it again.
        assert!(lock.try_acquire());
        assert!(lock.is_held());
    }

    #[test]
    fn test_acquire_stamps_unique_owner() {
        let temp = TempDir::new().unwrap();
        let lock = lock_in(&temp);

        assert!(lock.try_acquire());
        let first = lock.owner().unwrap();
        lock.release().unwrap();
        assert_eq!(lock.owner(), None);

        assert!(lock.try_acquire());
        assert_ne!(lock.owner().unwrap(), first);
    }

    #[test]
    fn test_guard_of_force_released_lock_spares_successor() {
        let temp = TempDir::new().unwrap();
        let lock = lock_in(&temp);
        assert!(lock.try_acquire());
        let held = lock.adopt();

        // The holder overruns the staleness threshold; the next caller takes over.
        std::thread::sleep(Duration::from_millis(20));
        assert!(lock.force_release_if_stale(Duration::from_millis(5)));
        assert!(lock.try_acquire());
        let successor = lock.owner();

        drop(held);

        assert!(lock.is_held(), "successor's lock was released");
        assert_eq!(lock.owner(), successor);
    }
}
