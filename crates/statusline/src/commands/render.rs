use std::io::{self, Read, Write};

use tracing::{debug, info, warn};

use statusline_core::credentials::read_access_token;
use statusline_core::profile::rig_profile_from_env;
use statusline_core::quota::{
    DetachedLauncher, FetchLauncher, RefreshDecision, RefreshPolicy, RefreshScheduler, evaluate,
};
use statusline_core::{BranchLookup, SessionInput};

use super::helpers::Context;
use crate::render::StatusLine;

pub(crate) fn handle_render_command() -> Result<(), Box<dyn std::error::Error>> {
    let mut input = Vec::new();
    io::stdin().read_to_end(&mut input)?;
    // Undecodable bytes must not abort the render; the JSON parse degrades.
    let session = SessionInput::parse(&String::from_utf8_lossy(&input));
    let ctx = Context::load_quiet();

    let token = ctx
        .paths
        .credentials()
        .and_then(|path| read_access_token(&path));

    // Single read of the cache; the refresh decision below never changes
    // what this invocation shows.
    let snapshot = ctx.store.cache.read();
    let cache_age = ctx.store.cache.age();

    if token.is_some() {
        let decision = schedule_refresh(&ctx, token.as_deref(), snapshot.is_some(), cache_age);
        debug!(event = "cli.render.refresh_decision", decision = ?decision);
    }

    let quota = evaluate(
        snapshot.as_ref(),
        cache_age,
        token.is_some(),
        ctx.config.quota.stale_after(),
    );

    let status = StatusLine {
        project: session.project_name,
        branch: current_branch(&ctx),
        profile: rig_profile_from_env(),
        model: session.model,
        context_used: session.context_used,
        quota,
        has_error: ctx.store.errors.has_error(),
        total_cost_usd: session.total_cost_usd,
    };

    let line = status.render();
    let mut stdout = io::stdout().lock();
    stdout.write_all(line.as_bytes())?;
    stdout.flush()?;

    info!(event = "cli.render.completed");
    Ok(())
}

fn schedule_refresh(
    ctx: &Context,
    token: Option<&str>,
    snapshot_present: bool,
    cache_age: Option<std::time::Duration>,
) -> RefreshDecision {
    let launcher = match DetachedLauncher::current_exe(["fetch-worker"]) {
        Ok(launcher) => launcher,
        Err(e) => {
            warn!(event = "cli.render.launcher_unavailable", error = %e);
            return RefreshDecision::LaunchFailed;
        }
    };
    let launcher: &dyn FetchLauncher = &launcher;
    let scheduler = RefreshScheduler::new(
        &ctx.store.lock,
        launcher,
        RefreshPolicy::from(&ctx.config.quota),
    );
    scheduler.maybe_refresh(token, snapshot_present, cache_age)
}

fn current_branch(ctx: &Context) -> Option<String> {
    if !ctx.config.git.enabled() {
        return None;
    }
    let cwd = std::env::current_dir().ok()?;
    BranchLookup::new(
        ctx.paths.branch_cache(),
        ctx.config.git.branch_cache_ttl(),
        ctx.config.git.command_timeout(),
    )
    .current_branch(&cwd)
}
