//! Formatting helpers shared by front ends.

use chrono::{DateTime, Utc};

use crate::types::GlucoseLevel;

/// Format a timestamp as relative time (e.g., "2m ago").
pub fn format_relative_time(ts: DateTime<Utc>) -> String {
    format_relative_time_at(ts, Utc::now())
}

fn format_relative_time_at(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(ts);

    if duration.num_seconds() < 0 {
        "just now".to_string()
    } else if duration.num_seconds() < 60 {
        format!("{}s ago", duration.num_seconds())
    } else if duration.num_minutes() < 60 {
        format!("{}m ago", duration.num_minutes())
    } else if duration.num_hours() < 24 {
        format!("{}h ago", duration.num_hours())
    } else if duration.num_days() < 7 {
        format!("{}d ago", duration.num_days())
    } else {
        ts.format("%b %d").to_string()
    }
}

/// pH for display: "7", "?" for an unreadable pad, "-" when never measured.
pub fn format_ph(ph: Option<Option<u8>>) -> String {
    match ph {
        Some(Some(value)) => value.to_string(),
        Some(None) => "?".to_string(),
        None => "-".to_string(),
    }
}

/// Single-character badge used in the calendar grid.
pub fn level_badge(level: Option<GlucoseLevel>) -> char {
    match level {
        Some(GlucoseLevel::Normal) => 'N',
        Some(GlucoseLevel::Caution) => 'C',
        Some(GlucoseLevel::Suspect) => 'S',
        Some(GlucoseLevel::Danger) => 'D',
        None => '.',
    }
}
