use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackInfo {
    pub title: String,
    pub channel: String,
    pub duration_seconds: f64,
}

impl TrackInfo {
    pub fn duration_formatted(&self) -> String {
        format_timestamp(self.duration_seconds)
    }
}

/// Renders seconds as `M:SS`, or `H:MM:SS` from one hour up.
pub fn format_timestamp(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0:00".to_string();
    }

    let whole = seconds.floor() as u64;
    let hours = whole / 3600;
    let minutes = (whole % 3600) / 60;
    let secs = whole % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}
