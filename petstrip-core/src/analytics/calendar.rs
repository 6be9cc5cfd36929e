//! Trailing-days calendar of recorded measurements.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::history::HistoryLog;
use crate::types::GlucoseLevel;

/// One calendar cell. A day may carry a level, a pH, both or neither.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub level: Option<GlucoseLevel>,
    pub ph: Option<u8>,
    /// True when the log holds a record for this date
    pub recorded: bool,
}

/// Trailing window ending today, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarView {
    pub days: Vec<CalendarDay>,
}

impl CalendarView {
    pub fn recorded_days(&self) -> usize {
        self.days.iter().filter(|day| day.recorded).count()
    }
}

/// Build the calendar for the `days` local dates ending at `today`.
pub fn calendar_view(log: &HistoryLog, today: NaiveDate, days: u32) -> CalendarView {
    let days = (0..days as i64)
        .rev()
        .map(|back| {
            let date = today - Duration::days(back);
            match log.get(date) {
                Some(entry) => CalendarDay {
                    date,
                    level: entry.level,
                    ph: entry.ph_value(),
                    recorded: true,
                },
                None => CalendarDay {
                    date,
                    level: None,
                    ph: None,
                    recorded: false,
                },
            }
        })
        .collect();

    CalendarView { days }
}
