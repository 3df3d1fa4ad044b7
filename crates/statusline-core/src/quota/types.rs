use serde::{Deserialize, Deserializer};

/// One rolling usage window as reported by the usage endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QuotaWindow {
    #[serde(default)]
    pub utilization: Option<f64>,
    #[serde(default)]
    pub resets_at: Option<String>,
}

/// Cached remote payload from `GET /api/oauth/usage`.
///
/// Each window is tri-state: absent from the payload (`None`), explicitly
/// `null` (`Some(None)`), or present (`Some(Some(_))`). An explicit `null`
/// means the account has no individual quota for that window.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct QuotaSnapshot {
    #[serde(default, deserialize_with = "explicit_null")]
    pub five_hour: Option<Option<QuotaWindow>>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub seven_day: Option<Option<QuotaWindow>>,
}

impl QuotaSnapshot {
    /// Organization plans report no individual quota windows.
    pub fn is_organization_plan(&self) -> bool {
        matches!(self.five_hour, Some(None)) || matches!(self.seven_day, Some(None))
    }

    pub fn five_hour_window(&self) -> Option<&QuotaWindow> {
        self.five_hour.as_ref().and_then(Option::as_ref)
    }

    pub fn seven_day_window(&self) -> Option<&QuotaWindow> {
        self.seven_day.as_ref().and_then(Option::as_ref)
    }
}

fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
