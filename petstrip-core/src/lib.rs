//! # petstrip-core
//!
//! Core library for petstrip - a pet urine test strip analyzer.
//!
//! This library provides:
//! - Color analysis of a test-pad photo (sampling, HSV, glucose and pH rules)
//! - A per-day history log with upsert-and-resort merging
//! - Calendar and statistics views over the history
//! - Document storage with SQLite, configuration and logging
//!
//! ## Architecture
//!
//! A photo flows through [`session::Analyzer`], which decodes it and runs the
//! [`analysis`] pipeline. The result stays pending until the owner confirms
//! it, at which point it is merged into the [`Repository`]. The repository
//! keeps the history in memory and writes it behind to a [`PersistenceStore`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use petstrip_core::{Config, Database, Repository, SyncAnalyzer};
//! use std::path::Path;
//!
//! let config = Config::load().expect("failed to load config");
//!
//! let db = Database::open(&Config::database_path()).expect("failed to open database");
//! db.migrate().expect("failed to run migrations");
//! let mut repo = Repository::load(db);
//!
//! let analyzer = SyncAnalyzer::new(config.analysis).expect("failed to start analyzer");
//! let inputs = repo.user_inputs().to_context(chrono::Local::now());
//! analyzer
//!     .analyze_path(Path::new("strip.jpg"), inputs)
//!     .expect("analysis failed");
//! analyzer.analyzer().confirm_glucose(&mut repo).expect("nothing pending");
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use db::Database;
pub use error::{Error, Result};
pub use history::{HistoryLog, UpsertOutcome};
pub use repository::Repository;
pub use session::{AnalysisOutcome, Analyzer, SyncAnalyzer};
pub use store::{MemoryStore, PersistenceStore};
pub use types::*;

// Public modules
pub mod analysis;
pub mod analytics;
pub mod config;
pub mod db;
pub mod decode;
pub mod error;
pub mod format;
pub mod history;
pub mod logging;
pub mod repository;
pub mod session;
pub mod store;
pub mod types;
