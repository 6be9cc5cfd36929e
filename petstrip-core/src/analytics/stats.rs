//! Level histogram, time series and measurement streaks.

use chrono::NaiveDate;
use serde::Serialize;

use super::calendar::calendar_view;
use crate::history::HistoryLog;
use crate::types::GlucoseLevel;

/// One chart point. `level` is shifted by one so Normal plots above zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub level: Option<u8>,
    pub ph: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsView {
    /// Records per level over the whole history, indexed by level
    pub level_counts: [u64; 4],
    /// Ascending by date
    pub series: Vec<SeriesPoint>,
    /// Enable the pH axis only when some point carries a pH
    pub show_ph_axis: bool,
    /// Consecutive recorded days ending today
    pub current_streak: u32,
    /// Longest run of recorded days in the window
    pub longest_streak: u32,
}

impl StatsView {
    pub fn count(&self, level: GlucoseLevel) -> u64 {
        self.level_counts[level.index()]
    }
}

/// Build the statistics view. Streaks cover the `window_days` ending `today`.
pub fn stats_view(log: &HistoryLog, today: NaiveDate, window_days: u32) -> StatsView {
    let mut level_counts = [0u64; 4];
    for level in log.entries().iter().filter_map(|entry| entry.level) {
        level_counts[level.index()] += 1;
    }

    let mut series: Vec<SeriesPoint> = log
        .entries()
        .iter()
        .map(|entry| SeriesPoint {
            date: entry.date,
            level: entry.level.map(|level| u8::from(level) + 1),
            ph: entry.ph_value(),
        })
        .collect();
    series.sort_by_key(|point| point.date);

    let show_ph_axis = series.iter().any(|point| point.ph.is_some());

    let recorded: Vec<bool> = calendar_view(log, today, window_days)
        .days
        .iter()
        .map(|day| day.recorded)
        .collect();
    let (current_streak, longest_streak) = calculate_streaks(&recorded);

    StatsView {
        level_counts,
        series,
        show_ph_axis,
        current_streak,
        longest_streak,
    }
}

/// Calculate streaks from per-day flags, oldest first.
/// Returns (current_streak, longest_streak).
pub fn calculate_streaks(recorded: &[bool]) -> (u32, u32) {
    let mut longest_streak = 0u32;
    let mut streak = 0u32;

    for &day in recorded {
        if day {
            streak += 1;
            longest_streak = longest_streak.max(streak);
        } else {
            streak = 0;
        }
    }

    // Count backwards from today
    let current_streak = recorded.iter().rev().take_while(|&&day| day).count() as u32;

    (current_streak, longest_streak)
}
