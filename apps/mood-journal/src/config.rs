//! Configuration for the mood journal.

use journal_stats::{Period, WeekStart, DEFAULT_HEATMAP_DAYS};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "mood-journal";

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Display settings.
    #[serde(default)]
    pub display: DisplayConfig,
    /// Stats view settings.
    #[serde(default)]
    pub stats: StatsConfig,
    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from default path.
    ///
    /// A missing file yields the defaults; an unreadable or malformed one is
    /// an error so the caller can report it once logging is up.
    pub fn load() -> anyhow::Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    fn load_from(path: &Path) -> anyhow::Result<Self> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(err).with_context(|| format!("reading {}", path.display()));
            }
        };
        Self::from_toml(&raw).with_context(|| format!("parsing {}", path.display()))
    }

    fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Get configuration file path.
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", APP_NAME)
            .map(|d| d.config_dir().join("config.toml"))
    }

    /// Get database path.
    pub fn db_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", APP_NAME)
            .map(|d| d.data_dir().join("journal.db"))
    }

    /// Get log file path.
    pub fn log_path(&self) -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", APP_NAME)
            .map(|d| d.data_dir().join(&self.logging.file))
    }
}

/// Display settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Date format string.
    #[serde(default = "default_date_format")]
    pub date_format: String,
    /// First day of week, used for wraps.
    #[serde(default)]
    pub week_start: WeekStart,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            date_format: default_date_format(),
            week_start: WeekStart::Monday,
        }
    }
}

fn default_date_format() -> String {
    "%A, %B %d, %Y".to_string()
}

/// Stats view settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Days shown in the activity heatmap.
    #[serde(default = "default_heatmap_days")]
    pub heatmap_days: u32,
    /// Period selected when the stats view opens.
    #[serde(default)]
    pub default_period: Period,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            heatmap_days: DEFAULT_HEATMAP_DAYS,
            default_period: Period::default(),
        }
    }
}

fn default_heatmap_days() -> u32 {
    DEFAULT_HEATMAP_DAYS
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,
    /// Log file name inside the data directory.
    #[serde(default = "default_log_file")]
    pub file: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            file: default_log_file(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "mood-journal.log".to_string()
}
