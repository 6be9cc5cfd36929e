//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/petstrip/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/petstrip/` (~/.config/petstrip/)
//! - Data: `$XDG_DATA_HOME/petstrip/` (~/.local/share/petstrip/)
//! - State/Logs: `$XDG_STATE_HOME/petstrip/` (~/.local/state/petstrip/)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "petstrip";

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    /// Sampling parameters for the color pipeline
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Calendar view configuration
    #[serde(default)]
    pub calendar: CalendarConfig,
}

/// Region sampling parameters
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Side length of the centered crop, as a fraction of the image (0, 1]
    #[serde(default = "default_roi_ratio")]
    pub roi_ratio: f64,

    /// Lowest luma accepted in the crop
    #[serde(default = "default_luma_min")]
    pub luma_min: f64,

    /// Highest luma accepted in the crop
    #[serde(default = "default_luma_max")]
    pub luma_max: f64,

    /// Valid pixels needed in the crop before the full-frame fallback kicks in
    #[serde(default = "default_min_valid_pixels")]
    pub min_valid_pixels: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            roi_ratio: default_roi_ratio(),
            luma_min: default_luma_min(),
            luma_max: default_luma_max(),
            min_valid_pixels: default_min_valid_pixels(),
        }
    }
}

impl AnalysisConfig {
    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if !(self.roi_ratio > 0.0 && self.roi_ratio <= 1.0) {
            return Err(Error::Config(
                "analysis.roi_ratio must be greater than 0 and at most 1".to_string(),
            ));
        }
        if !(0.0..=255.0).contains(&self.luma_min) || !(0.0..=255.0).contains(&self.luma_max) {
            return Err(Error::Config(
                "analysis.luma_min and analysis.luma_max must be between 0 and 255".to_string(),
            ));
        }
        if self.luma_min > self.luma_max {
            return Err(Error::Config(
                "analysis.luma_min must not exceed analysis.luma_max".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_roi_ratio() -> f64 {
    0.5
}

fn default_luma_min() -> f64 {
    30.0
}

fn default_luma_max() -> f64 {
    230.0
}

fn default_min_valid_pixels() -> u64 {
    50
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,

    /// Level for the classification pipeline; "debug" traces every rule match
    #[serde(default)]
    pub analysis: Option<String>,

    /// Level for history storage (database and write-behind)
    #[serde(default)]
    pub storage: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
            analysis: None,
            storage: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

/// Calendar view configuration
#[derive(Debug, Deserialize, Clone)]
pub struct CalendarConfig {
    /// Trailing days shown, today included
    #[serde(default = "default_calendar_days")]
    pub days: u32,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            days: default_calendar_days(),
        }
    }
}

fn default_calendar_days() -> u32 {
    30
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate every section
    pub fn validate(&self) -> Result<()> {
        self.analysis.validate()?;
        if self.calendar.days == 0 {
            return Err(Error::Config(
                "calendar.days must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/petstrip/config.toml` (~/.config/petstrip/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join(APP_DIR).join("config.toml")
    }

    /// Returns the data directory path (for SQLite database)
    ///
    /// `$XDG_DATA_HOME/petstrip/` (~/.local/share/petstrip/)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join(APP_DIR)
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/petstrip/` (~/.local/state/petstrip/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join(APP_DIR)
    }

    /// Returns the database file path
    ///
    /// `$XDG_DATA_HOME/petstrip/data.db` (~/.local/share/petstrip/data.db)
    pub fn database_path() -> PathBuf {
        Self::data_dir().join("data.db")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/petstrip/petstrip.log` (~/.local/state/petstrip/petstrip.log)
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("petstrip.log")
    }

    /// Ensure XDG base directory environment variables are set.
    ///
    /// Called by the CLI before anything reads these env vars.
    pub fn ensure_xdg_env() {
        let home = home_dir();

        if std::env::var("XDG_DATA_HOME").is_err() {
            std::env::set_var("XDG_DATA_HOME", home.join(".local/share"));
        }

        if std::env::var("XDG_STATE_HOME").is_err() {
            std::env::set_var("XDG_STATE_HOME", home.join(".local/state"));
        }

        if std::env::var("XDG_CONFIG_HOME").is_err() {
            std::env::set_var("XDG_CONFIG_HOME", home.join(".config"));
        }
    }
}
