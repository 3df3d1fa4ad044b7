//! Assembly of the single output line from already-resolved segments.

use statusline_core::quota::{QuotaDisplay, QuotaValue};

use crate::color;

const SEPARATOR: &str = " | ";

/// Everything one render shows. Built by the render command, formatted here.
#[derive(Debug, Clone, Default)]
pub struct StatusLine {
    pub project: Option<String>,
    pub branch: Option<String>,
    pub profile: Option<String>,
    pub model: String,
    pub context_used: f64,
    /// Present only when a bearer token exists.
    pub quota: Option<QuotaDisplay>,
    pub has_error: bool,
    pub total_cost_usd: Option<f64>,
}

impl StatusLine {
    /// Format the line. No trailing newline.
    pub fn render(&self) -> String {
        let mut segments = Vec::new();

        if let Some(project) = self.project_segment() {
            segments.push(project);
        }
        if let Some(profile) = &self.profile {
            segments.push(color::bold_magenta(profile));
        }
        segments.push(color::cyan(&self.model));
        segments.push(colored_value(QuotaValue::from_utilization(self.context_used)));

        if let Some(quota) = &self.quota {
            segments.push(quota.reset.clone());
            segments.push(format!("5h:{}", colored_value(quota.five_hour)));
            segments.push(format!("7d:{}", colored_value(quota.seven_day)));
            if self.has_error {
                segments.push(color::red("ERR"));
            }
        } else if let Some(cost) = self.total_cost_usd {
            segments.push(color::green(&format!("${:.2}", cost)));
        }

        segments.join(SEPARATOR)
    }

    fn project_segment(&self) -> Option<String> {
        match (&self.project, &self.branch) {
            (Some(project), Some(branch)) => Some(format!(
                "{} {}",
                color::bold_white(project),
                color::bold_yellow(&format!("[{}]", branch))
            )),
            (Some(project), None) => Some(color::bold_white(project)),
            (None, Some(branch)) => Some(color::bold_yellow(branch)),
            (None, None) => None,
        }
    }
}

/// Percentages are banded; placeholders stay uncolored.
fn colored_value(value: QuotaValue) -> String {
    match value.severity() {
        Some(severity) => color::severity(&value.to_string(), severity),
        None => value.to_string(),
    }
}
