use statusline_core::init_logging;
use statusline_paths::StatusPaths;

mod app;
pub(crate) mod color;
mod commands;
mod render;

fn main() {
    let app = app::build_cli();
    let matches = app.get_matches();

    // Handle --no-color before any output
    if matches.get_flag("no-color") || color::no_color_env() {
        color::set_no_color();
    }

    let verbose = matches.get_flag("verbose");
    init_logging(verbose, &StatusPaths::resolve().debug_log());

    if let Err(e) = commands::run_command(&matches) {
        // Nothing has been written to stdout; the host shows an empty line
        // instead of a partial one.
        tracing::error!(event = "cli.command_failed", error = %e);
        std::process::exit(1);
    }
}
