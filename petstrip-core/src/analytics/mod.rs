//! Derived views over the history log.
//!
//! Both views are recomputed on demand and never mutate the log.

pub mod calendar;
pub mod stats;

pub use calendar::{calendar_view, CalendarDay, CalendarView};
pub use stats::{calculate_streaks, stats_view, SeriesPoint, StatsView};
