//! Glucose risk classification from pad hue and brightness.

use super::rules::{first_match, HueBand};
use crate::types::{ClassificationResult, GlucoseLevel, Hsv};

/// Value (percent) at or above which a mid-hue pad reads as Caution.
const BRIGHT_VALUE_MIN: f64 = 75.0;

#[derive(Debug, Clone, Copy)]
enum Outcome {
    Fixed(GlucoseLevel),
    /// Level depends on brightness: `bright` when v >= BRIGHT_VALUE_MIN
    ByValue {
        bright: GlucoseLevel,
        dim: GlucoseLevel,
    },
}

/// Hue rules in evaluation order; hues matching none (140 < h < 160) fall to Suspect.
const HUE_RULES: [(HueBand, Outcome); 3] = [
    (HueBand::at_least(160.0), Outcome::Fixed(GlucoseLevel::Normal)),
    (
        HueBand::closed(60.0, 140.0),
        Outcome::ByValue {
            bright: GlucoseLevel::Caution,
            dim: GlucoseLevel::Suspect,
        },
    ),
    (HueBand::below(60.0), Outcome::Fixed(GlucoseLevel::Danger)),
];

const FALLBACK_LEVEL: GlucoseLevel = GlucoseLevel::Suspect;

/// Map hue/value to a risk level. Total over every input.
pub fn classify_level(hsv: &Hsv) -> GlucoseLevel {
    match first_match(&HUE_RULES, hsv.h) {
        Some(Outcome::Fixed(level)) => *level,
        Some(Outcome::ByValue { bright, dim }) => {
            if hsv.v >= BRIGHT_VALUE_MIN {
                *bright
            } else {
                *dim
            }
        }
        None => FALLBACK_LEVEL,
    }
}

/// Diagnosis line shown for a level.
pub fn diagnosis_text(level: GlucoseLevel) -> &'static str {
    match level {
        GlucoseLevel::Normal => "🟢 Normal: no urinary glucose detected",
        GlucoseLevel::Caution => "🟡 Caution: a trace of glucose may be present",
        GlucoseLevel::Suspect => "🟠 Suspect: glucose is likely present",
        GlucoseLevel::Danger => "🔴 Danger: high urinary glucose detected",
    }
}

/// Care guide shown for a level.
pub fn treatment_guide(level: GlucoseLevel) -> &'static str {
    match level {
        GlucoseLevel::Normal => {
            "Keep the current insulin dose and feeding schedule.\n\
             Normal play and walks are fine.\n\
             Re-test at the usual time tomorrow."
        }
        GlucoseLevel::Caution => {
            "Do not change the insulin dose on a single reading.\n\
             Check that meals were eaten in full and on time.\n\
             Keep activity light and re-test within 12 hours."
        }
        GlucoseLevel::Suspect => {
            "Record the reading and re-test at the next urination.\n\
             Make sure fresh water is always available.\n\
             Avoid strenuous exercise until readings improve.\n\
             Contact your vet if this repeats for two days."
        }
        GlucoseLevel::Danger => {
            "Do not increase the insulin dose without your vet's advice.\n\
             Offer water freely and keep the pet calm and rested.\n\
             Watch for vomiting, lethargy or heavy drinking.\n\
             Call your veterinarian today."
        }
    }
}

/// Full glucose classification for a pad color.
pub fn classify_glucose(hsv: &Hsv) -> ClassificationResult {
    let level = classify_level(hsv);
    tracing::debug!(h = hsv.h, v = hsv.v, level = level.as_str(), "Glucose classified");

    ClassificationResult {
        level,
        diagnosis: diagnosis_text(level).to_string(),
        guide: treatment_guide(level).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(h: f64, v: f64) -> GlucoseLevel {
        classify_level(&Hsv::new(h, 50.0, v))
    }

    #[test]
    fn test_high_hue_is_normal() {
        assert_eq!(level(160.0, 10.0), GlucoseLevel::Normal);
        assert_eq!(level(240.0, 90.0), GlucoseLevel::Normal);
        assert_eq!(level(359.99, 0.0), GlucoseLevel::Normal);
    }

    #[test]
    fn test_mid_hue_depends_on_value() {
        assert_eq!(level(60.0, 75.0), GlucoseLevel::Caution);
        assert_eq!(level(60.0, 74.99), GlucoseLevel::Suspect);
        assert_eq!(level(140.0, 100.0), GlucoseLevel::Caution);
        assert_eq!(level(140.0, 0.0), GlucoseLevel::Suspect);
    }

    #[test]
    fn test_gap_between_bands_is_suspect() {
        for h in [140.01, 150.0, 159.99] {
            assert_eq!(level(h, 100.0), GlucoseLevel::Suspect);
            assert_eq!(level(h, 0.0), GlucoseLevel::Suspect);
        }
    }

    #[test]
    fn test_low_hue_is_danger() {
        assert_eq!(level(59.99, 100.0), GlucoseLevel::Danger);
        assert_eq!(level(0.0, 0.0), GlucoseLevel::Danger);
    }

    #[test]
    fn test_total_over_grid() {
        let mut h = 0.0;
        while h < 360.0 {
            for v in [0.0, 25.0, 74.9, 75.0, 100.0] {
                let _ = level(h, v);
            }
            h += 0.5;
        }
    }

    #[test]
    fn test_texts_follow_level() {
        let result = classify_glucose(&Hsv::new(120.0, 75.0, 78.4));
        assert_eq!(result.level, GlucoseLevel::Caution);
        assert!(result.diagnosis.contains("Caution"));
        assert_eq!(result.guide, treatment_guide(GlucoseLevel::Caution));
        assert!(result.guide.lines().count() > 1);
    }
}
