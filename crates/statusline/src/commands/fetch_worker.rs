use tracing::{info, warn};

use statusline_core::quota::{FETCH_TOKEN_ENV, FetchOutcome, HttpUsageSource, run_fetch};

use super::helpers::Context;

/// Body of the detached background fetch.
///
/// The launching invocation already holds the refresh lock on this worker's
/// behalf, so every path out of here releases it. Outcomes are only visible
/// through the cache and error files; the exit code is always success.
pub(crate) fn handle_fetch_worker_command() -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::load_quiet();

    let token = std::env::var(FETCH_TOKEN_ENV)
        .ok()
        .filter(|token| !token.is_empty());
    let Some(token) = token else {
        warn!(event = "cli.fetch_worker.token_missing", env = FETCH_TOKEN_ENV);
        if let Err(e) = ctx.store.lock.release() {
            warn!(event = "cli.fetch_worker.lock_release_failed", error = %e);
        }
        return Ok(());
    };

    let source = HttpUsageSource::from(&ctx.config.quota);
    let outcome = run_fetch(
        &source,
        &token,
        &ctx.store.cache,
        &ctx.store.errors,
        &ctx.store.lock,
    );

    match outcome {
        FetchOutcome::Updated => info!(event = "cli.fetch_worker.completed", result = "updated"),
        FetchOutcome::CredentialsPending => {
            info!(event = "cli.fetch_worker.completed", result = "credentials_pending")
        }
        FetchOutcome::Failed(e) => {
            info!(event = "cli.fetch_worker.completed", result = "failed", error = %e)
        }
    }
    Ok(())
}
