//! Hand-off of the fetch to a fully detached worker process.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::info;

use super::errors::LaunchError;

/// Environment variable carrying the bearer token to the fetch worker.
///
/// Passed through the environment rather than argv so it does not appear in
/// process listings.
pub const FETCH_TOKEN_ENV: &str = "STATUSLINE_FETCH_TOKEN";

/// Starts a background fetch and returns without waiting for it.
pub trait FetchLauncher {
    fn launch(&self, token: &str) -> Result<(), LaunchError>;
}

/// Spawns `program args...` detached from the caller: null stdio, its own
/// process group, and no wait on the child handle.
#[derive(Debug, Clone)]
pub struct DetachedLauncher {
    program: PathBuf,
    args: Vec<OsString>,
}

impl DetachedLauncher {
    pub fn new<I, S>(program: PathBuf, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            program,
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Re-execute the running binary with `args`.
    pub fn current_exe<I, S>(args: I) -> Result<Self, LaunchError>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let program =
            std::env::current_exe().map_err(|source| LaunchError::ExecutableNotFound { source })?;
        Ok(Self::new(program, args))
    }
}

impl FetchLauncher for DetachedLauncher {
    fn launch(&self, token: &str) -> Result<(), LaunchError> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .env(FETCH_TOKEN_ENV, token)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        let child = command
            .spawn()
            .map_err(|source| LaunchError::SpawnFailed {
                program: self.program.clone(),
                source,
            })?;

        info!(event = "core.fetch_worker.launched", pid = child.id());
        // Dropping the handle does not kill or wait on the child.
        drop(child);
        Ok(())
    }
}
