//! Canonical JSON export of the history log.

use super::HistoryLog;
use crate::error::Result;

/// Pretty-printed JSON array of entries, in log order.
///
/// An empty log serializes to `[]`.
pub fn export_json(log: &HistoryLog) -> Result<String> {
    Ok(serde_json::to_string_pretty(log)?)
}

/// Default file name for an export taken on `date`.
pub fn export_file_name(date: chrono::NaiveDate) -> String {
    format!("petstrip-history-{}.json", date.format("%Y-%m-%d"))
}
