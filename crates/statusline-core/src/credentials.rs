//! OAuth access token lookup from the host's credentials file.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CredentialsFile {
    claude_ai_oauth: Option<OauthCredentials>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OauthCredentials {
    access_token: Option<String>,
}

/// Read the bearer token. Missing file, malformed JSON, or an empty token all
/// yield `None`, which disables the quota segment.
pub fn read_access_token(path: &Path) -> Option<String> {
    let content = fs::read_to_string(path).ok()?;
    let parsed: CredentialsFile = match serde_json::from_str(&content) {
        Ok(parsed) => parsed,
        Err(e) => {
            debug!(event = "core.credentials.parse_failed", path = %path.display(), error = %e);
            return None;
        }
    };

    parsed
        .claude_ai_oauth
        .and_then(|oauth| oauth.access_token)
        .filter(|token| !token.is_empty())
}
