//! Session data the host pipes to the statusline on stdin.
//!
//! Parsing never fails: every field is navigated leniently and falls back to
//! its default when absent, mistyped, or when the document is not JSON.

use std::path::Path;

use serde_json::Value;
use tracing::debug;

pub const UNKNOWN_MODEL: &str = "Unknown";

#[derive(Debug, Clone, PartialEq)]
pub struct SessionInput {
    pub model: String,
    pub context_used: f64,
    pub total_cost_usd: Option<f64>,
    /// Upper-cased basename of the workspace project directory.
    pub project_name: Option<String>,
}

impl Default for SessionInput {
    fn default() -> Self {
        Self {
            model: UNKNOWN_MODEL.to_string(),
            context_used: 0.0,
            total_cost_usd: None,
            project_name: None,
        }
    }
}

impl SessionInput {
    pub fn parse(input: &str) -> Self {
        let data: Value = match serde_json::from_str(input) {
            Ok(data) => data,
            Err(e) => {
                debug!(event = "core.session.input_parse_failed", error = %e);
                return Self::default();
            }
        };

        let model = data
            .pointer("/model/display_name")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .unwrap_or(UNKNOWN_MODEL)
            .to_string();

        let context_used = data
            .pointer("/context_window/used_percentage")
            .and_then(Value::as_f64)
            .unwrap_or(0.0);

        let total_cost_usd = data.pointer("/cost/total_cost_usd").and_then(Value::as_f64);

        let project_name = data
            .pointer("/workspace/project_dir")
            .and_then(Value::as_str)
            .filter(|dir| !dir.is_empty())
            .and_then(|dir| Path::new(dir).file_name())
            .map(|name| name.to_string_lossy().to_uppercase());

        Self {
            model,
            context_used,
            total_cost_usd,
            project_name,
        }
    }
}
