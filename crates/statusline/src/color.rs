//! ANSI styling for the status line and for the diagnostic subcommands.
//!
//! The status line is always written to a pipe read by the host, which
//! renders the escape sequences itself, so its styles are applied
//! unconditionally unless `--no-color` or `NO_COLOR` turns them off.
//! Messages on stderr (`refresh`, `errors`) go through `if_supports_color()`.

use std::sync::atomic::{AtomicBool, Ordering};

use owo_colors::{OwoColorize, Style};
use statusline_core::quota::Severity;

/// Global override: when true, forces color off.
static NO_COLOR_FLAG: AtomicBool = AtomicBool::new(false);

/// Call once from main.rs when `--no-color` is passed or `NO_COLOR` is set.
pub fn set_no_color() {
    NO_COLOR_FLAG.store(true, Ordering::Relaxed);
}

/// `NO_COLOR` set to any non-empty value (<https://no-color.org>).
pub fn no_color_env() -> bool {
    std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty())
}

fn no_color() -> bool {
    NO_COLOR_FLAG.load(Ordering::Relaxed)
}

fn paint(text: &str, style: Style, enabled: bool) -> String {
    if enabled {
        text.style(style).to_string()
    } else {
        text.to_string()
    }
}

// =============================================================================
// STATUS LINE STYLES
// =============================================================================

pub fn green(text: &str) -> String {
    paint(text, Style::new().green(), !no_color())
}

/// Elevated band (ANSI yellow, rendered orange by most themes).
pub fn orange(text: &str) -> String {
    paint(text, Style::new().yellow(), !no_color())
}

pub fn red(text: &str) -> String {
    paint(text, Style::new().red(), !no_color())
}

/// Model name.
pub fn cyan(text: &str) -> String {
    paint(text, Style::new().cyan(), !no_color())
}

/// Project name.
pub fn bold_white(text: &str) -> String {
    paint(text, Style::new().white().bold(), !no_color())
}

/// Branch name.
pub fn bold_yellow(text: &str) -> String {
    paint(text, Style::new().yellow().bold(), !no_color())
}

/// Profile name.
pub fn bold_magenta(text: &str) -> String {
    paint(text, Style::new().magenta().bold(), !no_color())
}

/// Color a percentage by its severity band.
pub fn severity(text: &str, severity: Severity) -> String {
    match severity {
        Severity::Nominal => green(text),
        Severity::Elevated => orange(text),
        Severity::Critical => red(text),
    }
}

// =============================================================================
// STDERR MESSAGES
// =============================================================================

/// Apply error styling (for stderr messages).
pub fn error(text: &str) -> String {
    if no_color() {
        return text.to_string();
    }
    text.if_supports_color(owo_colors::Stream::Stderr, |t| t.red())
        .to_string()
}

/// Apply hint styling (dimmed, for secondary info on stderr).
pub fn hint(text: &str) -> String {
    if no_color() {
        return text.to_string();
    }
    text.if_supports_color(owo_colors::Stream::Stderr, |t| t.dimmed())
        .to_string()
}
