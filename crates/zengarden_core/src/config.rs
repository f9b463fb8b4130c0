//! Core runtime configuration.
//!
//! # Responsibility
//! - Hold tunables shared by canvas, journal, meditation and sound services.
//! - Load configuration from JSON files with per-field defaults.
//!
//! # Invariants
//! - A validated config always has a canvas of at least 50x50 pixels.
//! - Stats windows are at least one day long.
//! - `default_volume` lies in `[0, 1]`.

use crate::logging::normalize_level;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Runtime configuration for the wellness core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Canvas width in pixels.
    pub canvas_width: f64,
    /// Canvas height in pixels.
    pub canvas_height: f64,
    /// Trailing window for journal page mood statistics.
    pub mood_stats_days: u32,
    /// Trailing window for the editor's inline mood statistics.
    pub inline_mood_stats_days: u32,
    /// Number of favorite meditation sessions to surface.
    pub favorites_limit: usize,
    /// Number of popular ambient sounds to surface.
    pub favorite_sounds_limit: usize,
    /// Initial global ambient volume.
    pub default_volume: f32,
    /// Offset from UTC used to cut calendar days and months.
    pub utc_offset_minutes: i32,
    /// Log level passed to `init_logging`.
    pub log_level: String,
    /// Absolute log directory. Logging stays off when unset.
    pub log_dir: Option<PathBuf>,
    /// SQLite database file used when no explicit path is given.
    pub db_path: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            canvas_width: 800.0,
            canvas_height: 600.0,
            mood_stats_days: 30,
            inline_mood_stats_days: 7,
            favorites_limit: 3,
            favorite_sounds_limit: 4,
            default_volume: 0.7,
            utc_offset_minutes: 0,
            log_level: crate::logging::default_log_level().to_string(),
            log_dir: None,
            db_path: None,
        }
    }
}

/// Configuration loading/validation error.
#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(serde_json::Error),
    Invalid { field: &'static str, message: String },
    MissingDbPath,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config json: {err}"),
            Self::Invalid { field, message } => write!(f, "invalid config `{field}`: {message}"),
            Self::MissingDbPath => write!(f, "no database path given and `db_path` is unset"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid { .. } | Self::MissingDbPath => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

impl CoreConfig {
    /// Parses and validates a JSON config document. Missing fields keep defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Checks cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.canvas_width.is_finite() || self.canvas_width < 50.0 {
            return Err(invalid("canvas_width", "must be a finite value >= 50"));
        }
        if !self.canvas_height.is_finite() || self.canvas_height < 50.0 {
            return Err(invalid("canvas_height", "must be a finite value >= 50"));
        }
        if self.mood_stats_days == 0 {
            return Err(invalid("mood_stats_days", "must be at least 1"));
        }
        if self.inline_mood_stats_days == 0 {
            return Err(invalid("inline_mood_stats_days", "must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.default_volume) {
            return Err(invalid("default_volume", "must be within [0, 1]"));
        }
        // chrono::FixedOffset accepts strictly less than one day.
        if self.utc_offset_minutes.unsigned_abs() >= 24 * 60 {
            return Err(invalid("utc_offset_minutes", "must be within one day"));
        }
        normalize_level(&self.log_level).map_err(|err| ConfigError::Invalid {
            field: "log_level",
            message: err.to_string(),
        })?;
        if let Some(dir) = self.log_dir.as_ref() {
            if !dir.is_absolute() {
                return Err(invalid("log_dir", "must be an absolute path"));
            }
        }
        Ok(())
    }

    /// Picks the database file: `explicit` wins, then `db_path`.
    pub fn resolve_db_path(&self, explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| self.db_path.clone())
            .ok_or(ConfigError::MissingDbPath)
    }
}

fn invalid(field: &'static str, message: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        message: message.to_string(),
    }
}
