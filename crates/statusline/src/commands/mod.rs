use clap::ArgMatches;
use tracing::error;

mod errors;
mod fetch_worker;
mod helpers;
mod refresh;
mod render;

pub fn run_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    match matches.subcommand() {
        None | Some(("render", _)) => render::handle_render_command(),
        Some(("refresh", _)) => refresh::handle_refresh_command(),
        Some(("errors", _)) => errors::handle_errors_command(),
        Some(("fetch-worker", _)) => fetch_worker::handle_fetch_worker_command(),
        Some((name, _)) => {
            error!(event = "cli.command_unknown", command = name);
            Err("Unknown command".into())
        }
    }
}
