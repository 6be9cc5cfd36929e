//! Logging infrastructure for petstrip
//!
//! Logs are written to `~/.local/state/petstrip/petstrip.log` following XDG standards.
//! The classifier and storage modules can be given their own levels in the
//! `[logging]` config section.

use crate::config::{Config, LoggingConfig};
use crate::error::{Error, Result};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Target covering sampling, color conversion and both classifiers.
const ANALYSIS_TARGET: &str = "petstrip_core::analysis";

/// Targets covering the SQLite store and the write-behind repository.
const STORAGE_TARGETS: [&str; 2] = ["petstrip_core::db", "petstrip_core::repository"];

/// Initialize the logging system
///
/// Sets up tracing with:
/// - File output to XDG state directory
/// - Daily rotation, keeping at most `max_files` files
/// - Per-module levels from config, or RUST_LOG when set
pub fn init(config: &LoggingConfig) -> Result<LoggingGuard> {
    let log_path = Config::log_path();
    let log_dir = Config::state_dir();
    let prefix = log_path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("petstrip.log");

    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .max_log_files(config.max_files.max(1))
        .build(&log_dir)
        .map_err(|e| Error::Config(format!("failed to create log appender: {}", e)))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => config_filter(config)?,
    };

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    // A second init (e.g. embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init();

    tracing::info!(
        log_path = %log_path.display(),
        filter = %filter_directives(config),
        "Logging initialized"
    );

    Ok(LoggingGuard { _guard: guard })
}

/// Filter directives for a logging config, base level first.
///
/// `level = "info"` with `analysis = "debug"` gives
/// `info,petstrip_core::analysis=debug`.
pub fn filter_directives(config: &LoggingConfig) -> String {
    let mut directives = vec![config.level.clone()];

    if let Some(level) = &config.analysis {
        directives.push(format!("{}={}", ANALYSIS_TARGET, level));
    }
    if let Some(level) = &config.storage {
        directives.extend(
            STORAGE_TARGETS
                .iter()
                .map(|target| format!("{}={}", target, level)),
        );
    }

    directives.join(",")
}

fn config_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    EnvFilter::try_new(filter_directives(config))
        .map_err(|e| Error::Config(format!("invalid [logging] level: {}", e)))
}

/// Initialize logging for tests (logs to stdout)
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .with_span_events(FmtSpan::CLOSE)
        .try_init();
}

/// Guard that keeps the logging system alive
///
/// When dropped, flushes any pending log writes.
pub struct LoggingGuard {
    _guard: tracing_appender::non_blocking::WorkerGuard,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_is_base_level() {
        assert_eq!(filter_directives(&LoggingConfig::default()), "info");
    }

    #[test]
    fn test_module_levels_follow_base() {
        let config = LoggingConfig {
            level: "warn".to_string(),
            analysis: Some("debug".to_string()),
            storage: Some("error".to_string()),
            ..Default::default()
        };
        assert_eq!(
            filter_directives(&config),
            "warn,petstrip_core::analysis=debug,petstrip_core::db=error,petstrip_core::repository=error"
        );
        assert!(config_filter(&config).is_ok());
    }

    #[test]
    fn test_unknown_module_level_is_config_error() {
        let config = LoggingConfig {
            analysis: Some("loud".to_string()),
            ..Default::default()
        };
        assert!(matches!(config_filter(&config), Err(Error::Config(_))));
    }

    #[test]
    fn test_analysis_target_matches_module_path() {
        assert!(module_path!().starts_with("petstrip_core::"));
        assert_eq!(
            ANALYSIS_TARGET,
            module_path!().replace("logging::tests", "analysis")
        );
    }
}
