mod global;
mod quota;


use clap::Command;

pub fn build_cli() -> Command {
    global::root_command()
        .subcommand(quota::render_command())
        .subcommand(quota::refresh_command())
        .subcommand(quota::errors_command())
        .subcommand(quota::fetch_worker_command())
}
