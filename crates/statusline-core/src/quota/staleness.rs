//! Maps the cached snapshot and its age to what the quota segment shows.
//!
//! Pure: the caller performs the single cache read and passes the result in.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Local, TimeZone};

use super::types::{QuotaSnapshot, QuotaWindow};

const STALE_PCT: &str = "--";
const STALE_TIME: &str = "--:--";
const NOT_APPLICABLE: &str = "N/A";
const UNKNOWN: &str = "?";

/// Cosmetic band for a percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// 0..=50
    Nominal,
    /// 51..=69
    Elevated,
    /// 70 and above
    Critical,
}

impl Severity {
    pub fn for_percent(percent: i64) -> Self {
        match percent {
            i64::MIN..=50 => Severity::Nominal,
            51..=69 => Severity::Elevated,
            _ => Severity::Critical,
        }
    }
}

/// One rendered quota percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaValue {
    Percent(i64),
    /// Window present but carries no utilization.
    Unknown,
    /// Cache missing or too old to trust.
    Stale,
    /// Account has no individual quota.
    NotApplicable,
}

impl QuotaValue {
    pub fn from_utilization(utilization: f64) -> Self {
        QuotaValue::Percent(round_percent(utilization))
    }

    pub fn severity(&self) -> Option<Severity> {
        match self {
            QuotaValue::Percent(p) => Some(Severity::for_percent(*p)),
            _ => None,
        }
    }
}

impl fmt::Display for QuotaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuotaValue::Percent(p) => write!(f, "{}%", p),
            QuotaValue::Unknown => f.write_str(UNKNOWN),
            QuotaValue::Stale => f.write_str(STALE_PCT),
            QuotaValue::NotApplicable => f.write_str(NOT_APPLICABLE),
        }
    }
}

/// Round a percentage for display. Non-finite input rounds to 0.
pub fn round_percent(value: f64) -> i64 {
    if value.is_finite() {
        value.round() as i64
    } else {
        0
    }
}

/// Everything the quota segment needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaDisplay {
    pub five_hour: QuotaValue,
    pub seven_day: QuotaValue,
    /// Local `HH:MM` of the five-hour reset, or a placeholder.
    pub reset: String,
}

impl QuotaDisplay {
    fn stale() -> Self {
        Self {
            five_hour: QuotaValue::Stale,
            seven_day: QuotaValue::Stale,
            reset: STALE_TIME.to_string(),
        }
    }

    fn not_applicable() -> Self {
        Self {
            five_hour: QuotaValue::NotApplicable,
            seven_day: QuotaValue::NotApplicable,
            reset: NOT_APPLICABLE.to_string(),
        }
    }
}

/// Decide what to show. Rows are evaluated top to bottom:
///
/// | condition | result |
/// |---|---|
/// | no token | `None` (segment omitted) |
/// | no snapshot, unknown age, or age >= `stale_after` | `--` / `--` / `--:--` |
/// | a window explicitly null | `N/A` / `N/A` / `N/A` |
/// | otherwise | rounded percentages and local reset time |
pub fn evaluate(
    snapshot: Option<&QuotaSnapshot>,
    age: Option<Duration>,
    has_token: bool,
    stale_after: Duration,
) -> Option<QuotaDisplay> {
    evaluate_in(snapshot, age, has_token, stale_after, &Local)
}

/// [`evaluate`] with an explicit timezone for the reset time.
pub fn evaluate_in<Tz: TimeZone>(
    snapshot: Option<&QuotaSnapshot>,
    age: Option<Duration>,
    has_token: bool,
    stale_after: Duration,
    tz: &Tz,
) -> Option<QuotaDisplay>
where
    Tz::Offset: fmt::Display,
{
    if !has_token {
        return None;
    }

    let snapshot = match (snapshot, age) {
        (Some(snapshot), Some(age)) if age < stale_after => snapshot,
        _ => return Some(QuotaDisplay::stale()),
    };

    if snapshot.is_organization_plan() {
        return Some(QuotaDisplay::not_applicable());
    }

    let five_hour = snapshot.five_hour_window();
    Some(QuotaDisplay {
        five_hour: window_value(five_hour),
        seven_day: window_value(snapshot.seven_day_window()),
        reset: five_hour
            .and_then(|w| w.resets_at.as_deref())
            .map(|iso| format_reset_time(iso, tz))
            .unwrap_or_else(|| STALE_TIME.to_string()),
    })
}

fn window_value(window: Option<&QuotaWindow>) -> QuotaValue {
    window
        .and_then(|w| w.utilization)
        .map(QuotaValue::from_utilization)
        .unwrap_or(QuotaValue::Unknown)
}

/// Convert an RFC 3339 timestamp to `HH:MM` in `tz`, rounded to the nearest
/// minute. Unparseable input yields `--:--`.
pub fn format_reset_time<Tz: TimeZone>(iso: &str, tz: &Tz) -> String
where
    Tz::Offset: fmt::Display,
{
    match DateTime::parse_from_rfc3339(iso) {
        Ok(at) => (at + chrono::Duration::seconds(30))
            .with_timezone(tz)
            .format("%H:%M")
            .to_string(),
        Err(_) => STALE_TIME.to_string(),
    }
}
