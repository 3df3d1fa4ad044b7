use clap::{Arg, ArgAction, Command};

pub fn root_command() -> Command {
    Command::new("statusline")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Render a one-line Claude Code status with cached quota usage")
        .long_about("Reads the session JSON the host pipes on stdin and prints a single colored status line: project, branch, model, context usage and the account's 5-hour and 7-day quota. Quota data is served from a local cache that a detached background worker refreshes, so rendering never waits on the network.")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging output on stderr")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("no-color")
                .long("no-color")
                .help("Disable colored output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
}
