use tracing::{error, info};

use statusline_core::credentials::read_access_token;
use statusline_core::quota::{FetchOutcome, HttpUsageSource, evaluate, run_fetch};
use statusline_paths::PathError;

use super::helpers::Context;
use crate::color;

/// Run one fetch in the foreground through the same lock and worker code the
/// detached refresh uses, then report what happened.
pub(crate) fn handle_refresh_command() -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::load_with_warning();
    info!(event = "cli.refresh_started");

    let Some(credentials) = ctx.paths.credentials() else {
        let e = PathError::HomeNotFound;
        eprintln!("{} {}", color::error("Error:"), e);
        error!(event = "cli.refresh_failed", reason = "home_not_found");
        return Err(e.into());
    };
    let Some(token) = read_access_token(&credentials) else {
        eprintln!(
            "{} No OAuth access token found in {}",
            color::error("Error:"),
            credentials.display()
        );
        eprintln!(
            "  {}",
            color::hint("Log in with Claude Code to create it, then retry.")
        );
        error!(event = "cli.refresh_failed", reason = "no_token");
        return Err("No OAuth access token".into());
    };

    let lock = &ctx.store.lock;
    lock.force_release_if_stale(ctx.config.quota.lock_stale_after());
    if !lock.try_acquire() {
        println!("A refresh is already in progress; the cache will update shortly.");
        info!(event = "cli.refresh_completed", result = "lock_busy");
        return Ok(());
    }

    let source = HttpUsageSource::from(&ctx.config.quota);
    match run_fetch(&source, &token, &ctx.store.cache, &ctx.store.errors, lock) {
        FetchOutcome::Updated => {
            let snapshot = ctx.store.cache.read();
            let display = evaluate(
                snapshot.as_ref(),
                ctx.store.cache.age(),
                true,
                ctx.config.quota.stale_after(),
            );
            match display {
                Some(d) => println!(
                    "{} 5h: {}  7d: {}  resets: {}",
                    color::green("Quota updated."),
                    d.five_hour,
                    d.seven_day,
                    d.reset
                ),
                None => println!("{}", color::green("Quota updated.")),
            }
            info!(event = "cli.refresh_completed", result = "updated");
            Ok(())
        }
        FetchOutcome::CredentialsPending => {
            println!("Usage endpoint answered 401; credentials may not be active yet.");
            info!(event = "cli.refresh_completed", result = "credentials_pending");
            Ok(())
        }
        FetchOutcome::Failed(e) => {
            eprintln!("{} Quota fetch failed: {}", color::error("Error:"), e);
            error!(event = "cli.refresh_failed", error = %e);
            Err(e.into())
        }
    }
}
