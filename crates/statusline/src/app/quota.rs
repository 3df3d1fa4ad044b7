use clap::Command;

pub fn render_command() -> Command {
    Command::new("render")
        .about("Render the status line from session JSON on stdin (default)")
}

pub fn refresh_command() -> Command {
    Command::new("refresh")
        .about("Fetch quota usage now, in the foreground, and update the cache")
}

pub fn errors_command() -> Command {
    Command::new("errors").about("Show recent quota fetch errors, oldest first")
}

/// Entry point of the detached background fetch. The bearer token arrives
/// through the environment.
pub fn fetch_worker_command() -> Command {
    Command::new("fetch-worker")
        .about("Run one background quota fetch (internal)")
        .hide(true)
}
