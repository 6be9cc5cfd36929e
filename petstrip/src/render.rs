//! Plain-text rendering of results and views.

use petstrip_core::analytics::{CalendarView, StatsView};
use petstrip_core::format::{format_ph, format_relative_time, level_badge};
use petstrip_core::{GlucoseLevel, HistoryLog, PendingResult, UserInputs};
use std::fmt::Write;

pub fn pending(result: &PendingResult) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Sample:   {} (H {:.1}, S {:.1}%, V {:.1}%)",
        result.sample.hex(),
        result.hsv.h,
        result.hsv.s,
        result.hsv.v
    );
    let _ = writeln!(out, "Glucose:  {}", result.glucose.diagnosis);
    for line in result.glucose.guide.lines() {
        let _ = writeln!(out, "          - {}", line);
    }
    let _ = writeln!(out, "pH:       {} [{}]", result.ph.label, result.ph.metrics);
    if result.ph.is_low_confidence() {
        let _ = writeln!(out, "          Retake the photo in even, brighter light.");
    }
    let _ = writeln!(out, "Context:  {}", result.context_metrics);
    out
}

pub fn inputs(inputs: &UserInputs) -> String {
    let hour = inputs
        .measured_hour
        .map(|h| format!("{:02}:00", h))
        .unwrap_or_else(|| "current time".to_string());

    let mut out = String::new();
    let _ = writeln!(out, "Water intake:     {} ml", inputs.water_intake_ml);
    let _ = writeln!(out, "Elapsed time:     {} min", inputs.elapsed_minutes);
    let _ = writeln!(out, "Since last meal:  {} min", inputs.after_meal_minutes);
    let _ = writeln!(out, "Measured at:      {}", hour);
    out
}

pub fn history(log: &HistoryLog) -> String {
    if log.is_empty() {
        return "No measurements recorded yet.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "{:<12} {:<8} {:<4} RECORDED", "DATE", "LEVEL", "PH");
    for entry in log.entries() {
        let _ = writeln!(
            out,
            "{:<12} {:<8} {:<4} {}",
            entry.date.to_string(),
            entry.level.map(|l| l.as_str()).unwrap_or("-"),
            format_ph(entry.ph),
            format_relative_time(entry.timestamp)
        );
    }
    out
}

pub fn calendar(view: &CalendarView) -> String {
    let mut out = String::new();
    let strip: String = view.days.iter().map(|day| level_badge(day.level)).collect();
    let _ = writeln!(out, "{}", strip);
    let _ = writeln!(out);

    for day in view.days.iter().filter(|day| day.recorded) {
        let _ = writeln!(
            out,
            "{}  {}  pH {}",
            day.date.format("%a %m-%d"),
            level_badge(day.level),
            day.ph.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string())
        );
    }

    let _ = writeln!(
        out,
        "Recorded {} of {} days (N normal, C caution, S suspect, D danger)",
        view.recorded_days(),
        view.days.len()
    );
    out
}

pub fn stats(view: &StatsView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Levels");
    for level in GlucoseLevel::ALL {
        let _ = writeln!(out, "  {:<8} {}", level.as_str(), view.count(level));
    }
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Streak:   {} days (longest {})",
        view.current_streak, view.longest_streak
    );
    let _ = writeln!(
        out,
        "pH axis:  {}",
        if view.show_ph_axis { "on" } else { "off" }
    );

    if !view.series.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{:<12} {:<6} PH", "DATE", "LEVEL");
        for point in &view.series {
            let _ = writeln!(
                out,
                "{:<12} {:<6} {}",
                point.date.to_string(),
                point
                    .level
                    .map(|l| l.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                point
                    .ph
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "-".to_string())
            );
        }
    }
    out
}
