//! Core domain types for petstrip
//!
//! These types carry a test-pad photo from raw color through classification
//! and into the per-day history log.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Sample** | One representative RGB color averaged from the photo |
//! | **Level** | Four-tier glucose risk (Normal, Caution, Suspect, Danger) |
//! | **Pending result** | An analysis awaiting explicit confirmation by the owner |
//! | **History entry** | One calendar day's merged measurement record |
//! | **Patch** | A partial update to a history entry, keyed by date |

use chrono::{DateTime, Local, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ============================================
// Color
// ============================================

/// Representative color of a test pad, channels 0-255.
///
/// Always produced by the sampler; may degenerate to black when no pixel
/// passed the luma filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Hex representation, e.g. `#32C832`.
    pub fn hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Hue in degrees [0, 360), saturation and value in percent [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Hsv {
    pub h: f64,
    pub s: f64,
    pub v: f64,
}

impl Hsv {
    pub const fn new(h: f64, s: f64, v: f64) -> Self {
        Self { h, s, v }
    }
}

// ============================================
// Context
// ============================================

/// Situational inputs used to adjust the blue channel for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContextInputs {
    /// Hour of day the sample was taken (0-23)
    pub hour_of_day: u32,
    /// Minutes since the pet's last meal
    pub after_meal_minutes: u32,
    /// Water drunk before sampling, in millilitres
    pub water_ml: u32,
    /// Minutes elapsed between sampling and photographing
    pub elapsed_minutes: u32,
}

/// Owner-entered inputs, persisted across sessions as one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserInputs {
    pub water_intake_ml: u32,
    pub elapsed_minutes: u32,
    pub after_meal_minutes: u32,
    /// Measurement hour override; the local clock is used when absent.
    pub measured_hour: Option<u32>,
}

impl Default for UserInputs {
    fn default() -> Self {
        Self {
            water_intake_ml: 0,
            elapsed_minutes: 0,
            // Default to "well after a meal" so the meal factor stays neutral.
            after_meal_minutes: 120,
            measured_hour: None,
        }
    }
}

impl UserInputs {
    /// Resolve against the given local time.
    pub fn to_context(&self, now: DateTime<Local>) -> ContextInputs {
        ContextInputs {
            hour_of_day: self.measured_hour.unwrap_or_else(|| now.hour()).min(23),
            after_meal_minutes: self.after_meal_minutes,
            water_ml: self.water_intake_ml,
            elapsed_minutes: self.elapsed_minutes,
        }
    }
}

// ============================================
// Classification
// ============================================

/// Four-tier glucose risk level, persisted as its index 0-3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum GlucoseLevel {
    Normal = 0,
    Caution = 1,
    Suspect = 2,
    Danger = 3,
}

impl GlucoseLevel {
    pub const ALL: [GlucoseLevel; 4] = [
        GlucoseLevel::Normal,
        GlucoseLevel::Caution,
        GlucoseLevel::Suspect,
        GlucoseLevel::Danger,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GlucoseLevel::Normal => "Normal",
            GlucoseLevel::Caution => "Caution",
            GlucoseLevel::Suspect => "Suspect",
            GlucoseLevel::Danger => "Danger",
        }
    }
}

impl From<GlucoseLevel> for u8 {
    fn from(level: GlucoseLevel) -> Self {
        level as u8
    }
}

impl TryFrom<u8> for GlucoseLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(GlucoseLevel::Normal),
            1 => Ok(GlucoseLevel::Caution),
            2 => Ok(GlucoseLevel::Suspect),
            3 => Ok(GlucoseLevel::Danger),
            _ => Err(format!("unknown glucose level: {}", value)),
        }
    }
}

/// Glucose classification with its owner-facing texts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub level: GlucoseLevel,
    pub diagnosis: String,
    pub guide: String,
}

/// pH estimate. `ph` is `None` when the pad was too dark or too grey to read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhResult {
    pub ph: Option<u8>,
    pub label: String,
    pub metrics: String,
}

impl PhResult {
    /// True when the pad could not be read (not an error).
    pub fn is_low_confidence(&self) -> bool {
        self.ph.is_none()
    }
}

// ============================================
// History
// ============================================

/// One calendar day's merged record.
///
/// `ph` distinguishes "never measured" (`None`) from "measured but
/// unreadable" (`Some(None)`, serialized as `null`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub date: NaiveDate,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<GlucoseLevel>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_nullable"
    )]
    pub ph: Option<Option<u8>>,
}

impl HistoryEntry {
    /// The pH value when one was recorded and readable.
    pub fn ph_value(&self) -> Option<u8> {
        self.ph.flatten()
    }
}

/// pH values the strip can report.
pub const PH_RANGE: std::ops::RangeInclusive<u8> = 5..=9;

/// A key present in JSON (even as `null`) deserializes to `Some(..)`.
/// Readable values must fall in [`PH_RANGE`].
fn present_nullable<'de, D>(deserializer: D) -> Result<Option<Option<u8>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<u8>::deserialize(deserializer)? {
        Some(ph) if !PH_RANGE.contains(&ph) => Err(serde::de::Error::custom(format!(
            "pH {} outside {}..={}",
            ph,
            PH_RANGE.start(),
            PH_RANGE.end()
        ))),
        ph => Ok(Some(ph)),
    }
}

/// Whether a patch carries a value for a field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Field<T> {
    /// Leave whatever the record holds
    #[default]
    Absent,
    /// Overwrite, even when the value is itself a null
    Set(T),
}

/// Partial update to the history log, identified by `date`.
///
/// The glucose path sets `diagnosis` + `level`; the pH path sets `ph`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryPatch {
    pub date: NaiveDate,
    pub timestamp: DateTime<Utc>,
    pub diagnosis: Field<String>,
    pub level: Field<GlucoseLevel>,
    pub ph: Field<Option<u8>>,
}

impl HistoryPatch {
    /// Patch carrying the glucose classification.
    pub fn glucose(date: NaiveDate, timestamp: DateTime<Utc>, result: &ClassificationResult) -> Self {
        Self {
            date,
            timestamp,
            diagnosis: Field::Set(result.diagnosis.clone()),
            level: Field::Set(result.level),
            ph: Field::Absent,
        }
    }

    /// Patch carrying the pH estimate (`None` is written as an explicit null).
    pub fn ph(date: NaiveDate, timestamp: DateTime<Utc>, ph: Option<u8>) -> Self {
        Self {
            date,
            timestamp,
            diagnosis: Field::Absent,
            level: Field::Absent,
            ph: Field::Set(ph),
        }
    }

    /// Materialize as a fresh entry (used when no record exists for the date).
    pub fn into_entry(self) -> HistoryEntry {
        let mut entry = HistoryEntry {
            date: self.date,
            timestamp: self.timestamp,
            diagnosis: None,
            level: None,
            ph: None,
        };
        self.apply_to(&mut entry);
        entry
    }

    /// Shallow merge: set fields overwrite, absent fields keep prior values.
    pub fn apply_to(self, entry: &mut HistoryEntry) {
        entry.timestamp = self.timestamp;
        if let Field::Set(diagnosis) = self.diagnosis {
            entry.diagnosis = Some(diagnosis);
        }
        if let Field::Set(level) = self.level {
            entry.level = Some(level);
        }
        if let Field::Set(ph) = self.ph {
            entry.ph = Some(ph);
        }
    }
}

// ============================================
// Pending analysis
// ============================================

/// Analysis outcome awaiting confirmation before it enters the history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingResult {
    /// Generation of the request that produced this result
    pub generation: u64,
    /// Local calendar day at capture time
    pub date: NaiveDate,
    /// Capture instant
    pub timestamp: DateTime<Utc>,
    pub sample: Rgb,
    pub hsv: Hsv,
    pub glucose: ClassificationResult,
    pub ph: PhResult,
    /// Context-adjusted blue channel, diagnostic only
    pub adjusted_blue: u8,
    /// Human-readable context diagnostics
    pub context_metrics: String,
}
