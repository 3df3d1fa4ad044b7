//! Profile name detection for `claude-rig` managed config directories.

use std::sync::LazyLock;

use regex::Regex;

/// Environment variable the host reads its config directory from.
pub const CONFIG_DIR_ENV: &str = "CLAUDE_CONFIG_DIR";

static RIG_PROFILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.claude-rig/profiles/([^/]+)/?$").expect("profile pattern is valid")
});

/// Extract `<name>` from a `.../.claude-rig/profiles/<name>` config dir.
pub fn rig_profile(config_dir: &str) -> Option<String> {
    RIG_PROFILE
        .captures(config_dir)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Profile name from `CLAUDE_CONFIG_DIR`, if it follows the rig layout.
pub fn rig_profile_from_env() -> Option<String> {
    let config_dir = std::env::var(CONFIG_DIR_ENV).ok()?;
    rig_profile(&config_dir)
}
