use tracing::info;

use super::helpers::Context;
use crate::color;

pub(crate) fn handle_errors_command() -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::load_with_warning();
    let entries = ctx.store.errors.entries();

    info!(event = "cli.errors_listed", count = entries.len());

    if entries.is_empty() {
        println!("No quota fetch errors recorded.");
        return Ok(());
    }

    for entry in &entries {
        println!("{}", entry);
    }
    if ctx.store.errors.has_error() {
        eprintln!(
            "{}",
            color::hint("The most recent fetch failed; the status line shows ERR until one succeeds.")
        );
    }
    Ok(())
}
