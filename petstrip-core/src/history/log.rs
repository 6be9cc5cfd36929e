//! Per-day measurement log with upsert-and-resort semantics.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{HistoryEntry, HistoryPatch};

/// What an upsert did to the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Merged,
}

/// Ordered history, ascending by timestamp with at most one entry per date.
///
/// Deserializing folds the records through [`HistoryLog::upsert`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from arbitrary records (e.g. a loaded document), restoring the
    /// ordering and one-per-date invariants by folding duplicates in order.
    pub fn from_entries(entries: Vec<HistoryEntry>) -> Self {
        let mut log = Self::new();
        for entry in entries {
            log.upsert(patch_from_entry(entry));
        }
        log
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&HistoryEntry> {
        self.entries.iter().find(|entry| entry.date == date)
    }

    /// Merge into the record for `patch.date`, or insert one, then resort.
    pub fn upsert(&mut self, patch: HistoryPatch) -> UpsertOutcome {
        let outcome = match self.entries.iter_mut().find(|entry| entry.date == patch.date) {
            Some(existing) => {
                patch.apply_to(existing);
                UpsertOutcome::Merged
            }
            None => {
                self.entries.push(patch.into_entry());
                UpsertOutcome::Inserted
            }
        };

        // Dates are unique, so (timestamp, date) is a total order.
        self.entries.sort_by_key(|entry| (entry.timestamp, entry.date));
        outcome
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<'de> Deserialize<'de> for HistoryLog {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Vec::<HistoryEntry>::deserialize(deserializer).map(Self::from_entries)
    }
}

/// Loaded entries carry only the keys they were saved with.
fn patch_from_entry(entry: HistoryEntry) -> HistoryPatch {
    use crate::types::Field;

    HistoryPatch {
        date: entry.date,
        timestamp: entry.timestamp,
        diagnosis: entry.diagnosis.map(Field::Set).unwrap_or(Field::Absent),
        level: entry.level.map(Field::Set).unwrap_or(Field::Absent),
        ph: entry.ph.map(Field::Set).unwrap_or(Field::Absent),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClassificationResult, Field, GlucoseLevel};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn at(hour: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, d, hour, 0, 0).unwrap()
    }

    fn glucose(level: GlucoseLevel) -> ClassificationResult {
        ClassificationResult {
            level,
            diagnosis: level.as_str().to_string(),
            guide: String::new(),
        }
    }

    #[test]
    fn test_ph_then_glucose_merge_into_one_record() {
        let mut log = HistoryLog::new();
        assert_eq!(
            log.upsert(HistoryPatch::ph(day("2025-01-01"), at(8, 1), Some(7))),
            UpsertOutcome::Inserted
        );
        assert_eq!(
            log.upsert(HistoryPatch::glucose(
                day("2025-01-01"),
                at(9, 1),
                &glucose(GlucoseLevel::Suspect)
            )),
            UpsertOutcome::Merged
        );

        assert_eq!(log.len(), 1);
        let entry = log.get(day("2025-01-01")).unwrap();
        assert_eq!(entry.ph, Some(Some(7)));
        assert_eq!(entry.level, Some(GlucoseLevel::Suspect));
    }

    #[test]
    fn test_explicit_null_overwrites_prior_ph() {
        let mut log = HistoryLog::new();
        log.upsert(HistoryPatch::ph(day("2025-01-01"), at(8, 1), Some(7)));
        log.upsert(HistoryPatch::ph(day("2025-01-01"), at(9, 1), None));
        assert_eq!(log.get(day("2025-01-01")).unwrap().ph, Some(None));
    }

    #[test]
    fn test_absent_fields_never_clear() {
        let mut log = HistoryLog::new();
        log.upsert(HistoryPatch::glucose(
            day("2025-01-01"),
            at(8, 1),
            &glucose(GlucoseLevel::Danger),
        ));
        log.upsert(HistoryPatch {
            date: day("2025-01-01"),
            timestamp: at(10, 1),
            diagnosis: Field::Absent,
            level: Field::Absent,
            ph: Field::Absent,
        });
        let entry = log.get(day("2025-01-01")).unwrap();
        assert_eq!(entry.level, Some(GlucoseLevel::Danger));
        assert_eq!(entry.timestamp, at(10, 1));
    }

    #[test]
    fn test_sorted_after_out_of_order_upserts() {
        let mut log = HistoryLog::new();
        log.upsert(HistoryPatch::ph(day("2025-01-03"), at(8, 3), Some(6)));
        log.upsert(HistoryPatch::ph(day("2025-01-01"), at(8, 1), Some(7)));
        log.upsert(HistoryPatch::ph(day("2025-01-02"), at(8, 2), Some(8)));

        let dates: Vec<_> = log.entries().iter().map(|e| e.date).collect();
        assert_eq!(
            dates,
            vec![day("2025-01-01"), day("2025-01-02"), day("2025-01-03")]
        );
    }

    #[test]
    fn test_merge_moves_record_to_new_timestamp_position() {
        let mut log = HistoryLog::new();
        log.upsert(HistoryPatch::ph(day("2025-01-01"), at(8, 1), Some(7)));
        log.upsert(HistoryPatch::ph(day("2025-01-02"), at(8, 2), Some(7)));
        // Late confirmation of an earlier day's capture pushes it last
        log.upsert(HistoryPatch::ph(day("2025-01-01"), at(9, 3), Some(6)));

        assert_eq!(log.entries()[1].date, day("2025-01-01"));
    }

    #[test]
    fn test_invariants_hold_over_many_upserts() {
        let mut log = HistoryLog::new();
        let base = at(0, 1);
        for i in 0..200i64 {
            let date = day("2025-01-01") + Duration::days((i * 7) % 13);
            let ts = base + Duration::minutes((i * 37) % 1000 + i * 1000);
            log.upsert(HistoryPatch::ph(date, ts, Some(5 + (i % 5) as u8)));
        }

        assert!(log.len() <= 13);
        for pair in log.entries().windows(2) {
            assert!(pair[0].timestamp < pair[1].timestamp);
        }
        let mut dates: Vec<_> = log.entries().iter().map(|e| e.date).collect();
        dates.sort();
        dates.dedup();
        assert_eq!(dates.len(), log.len());
    }

    #[test]
    fn test_from_entries_folds_duplicate_dates() {
        let entries = vec![
            HistoryPatch::ph(day("2025-01-02"), at(8, 2), Some(8)).into_entry(),
            HistoryPatch::ph(day("2025-01-01"), at(8, 1), Some(7)).into_entry(),
            HistoryPatch::glucose(day("2025-01-01"), at(9, 1), &glucose(GlucoseLevel::Normal))
                .into_entry(),
        ];
        let log = HistoryLog::from_entries(entries);
        assert_eq!(log.len(), 2);
        let first = &log.entries()[0];
        assert_eq!(first.date, day("2025-01-01"));
        assert_eq!(first.ph, Some(Some(7)));
        assert_eq!(first.level, Some(GlucoseLevel::Normal));
    }

    #[test]
    fn test_deserialize_restores_invariants() {
        let json = r#"[
            {"date": "2025-01-02", "timestamp": "2025-01-02T08:00:00Z", "ph": 7},
            {"date": "2025-01-01", "timestamp": "2025-01-01T08:00:00Z", "ph": 6},
            {"date": "2025-01-01", "timestamp": "2025-01-01T09:00:00Z", "level": 2}
        ]"#;
        let log: HistoryLog = serde_json::from_str(json).unwrap();

        assert_eq!(log.len(), 2);
        let dates: Vec<_> = log.entries().iter().map(|e| e.date).collect();
        assert_eq!(dates, vec![day("2025-01-01"), day("2025-01-02")]);
        let first = &log.entries()[0];
        assert_eq!(first.ph, Some(Some(6)));
        assert_eq!(first.level, Some(GlucoseLevel::Suspect));
    }

    #[test]
    fn test_equal_timestamps_order_by_date() {
        let ts = at(8, 1);
        let mut log = HistoryLog::new();
        log.upsert(HistoryPatch::ph(day("2025-01-03"), ts, Some(6)));
        log.upsert(HistoryPatch::ph(day("2025-01-01"), ts, Some(7)));
        log.upsert(HistoryPatch::ph(day("2025-01-02"), ts, Some(8)));

        let dates: Vec<_> = log.entries().iter().map(|e| e.date).collect();
        assert_eq!(
            dates,
            vec![day("2025-01-01"), day("2025-01-02"), day("2025-01-03")]
        );
    }
}
