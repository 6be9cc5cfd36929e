//! Database layer for petstrip
//!
//! SQLite-backed document store:
//! - Schema migrations
//! - One row per persisted document (history log, user inputs)

pub mod repo;
pub mod schema;

pub use repo::Database;
