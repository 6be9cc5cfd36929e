//! History of confirmed measurements
//!
//! One record per local calendar day. Glucose and pH results are confirmed
//! separately and merge into the same day's record.

pub mod export;
pub mod log;

pub use export::{export_file_name, export_json};
pub use log::{HistoryLog, UpsertOutcome};
