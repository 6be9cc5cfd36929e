//! pH estimate from pad hue, with low-confidence guards.

use super::rules::{first_match, HueBand};
use crate::types::{Hsv, PhResult};

/// Below this value (percent) the pad is too dark to read.
pub const MIN_VALUE: f64 = 25.0;
/// Below this saturation (percent) the pad is too grey to read.
pub const MIN_SATURATION: f64 = 8.0;

pub const LABEL_TOO_DARK: &str = "too dark to measure";
pub const LABEL_TOO_DESATURATED: &str = "too desaturated to measure";

/// (band, pH, estimated) in evaluation order.
const PH_BANDS: [(HueBand, (u8, bool)); 7] = [
    (HueBand::half_open(20.0, 45.0), (5, false)),
    (HueBand::half_open(45.0, 58.0), (6, false)),
    (HueBand::half_open(58.0, 80.0), (7, false)),
    (HueBand::half_open(80.0, 150.0), (8, false)),
    (HueBand::closed(150.0, 190.0), (9, false)),
    (HueBand::below(20.0), (5, true)),
    (HueBand::at_least(190.0), (9, true)),
];

fn ph_label(ph: u8) -> &'static str {
    match ph {
        5 => "pH 5 (acidic)",
        6 => "pH 6 (slightly acidic)",
        7 => "pH 7 (neutral)",
        8 => "pH 8 (slightly alkaline)",
        _ => "pH 9 (alkaline)",
    }
}

fn metrics(hsv: &Hsv) -> String {
    format!(
        "H:{} S:{} V:{}",
        hsv.h.round() as i64,
        hsv.s.round() as i64,
        hsv.v.round() as i64
    )
}

/// Estimate pH. Unreadable pads return `ph = None` with the reason as label.
pub fn classify_ph(hsv: &Hsv) -> PhResult {
    let metrics = metrics(hsv);

    if hsv.v < MIN_VALUE {
        return PhResult {
            ph: None,
            label: LABEL_TOO_DARK.to_string(),
            metrics,
        };
    }
    if hsv.s < MIN_SATURATION {
        return PhResult {
            ph: None,
            label: LABEL_TOO_DESATURATED.to_string(),
            metrics,
        };
    }

    // Table covers the whole real line; NaN hue matches nothing.
    let (ph, estimated) = first_match(&PH_BANDS, hsv.h).copied().unwrap_or((9, true));
    let label = if estimated {
        format!("{} (estimated)", ph_label(ph))
    } else {
        ph_label(ph).to_string()
    };

    tracing::debug!(h = hsv.h, ph, estimated, "pH classified");

    PhResult {
        ph: Some(ph),
        label,
        metrics,
    }
}
