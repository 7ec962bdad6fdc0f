//! Runtime configuration for the logger, built from `LoggerSettings`.

use crate::logger::error::LoggerError;
use chrono::{DateTime, Duration, Utc};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::Level;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    pub level: Level,
    pub console: ConsoleConfig,
    pub file: FileConfig,
}

impl LoggerConfig {
    pub fn new(console: ConsoleConfig, file: FileConfig, level: &str) -> Result<Self, LoggerError> {
        let config = Self {
            level: parse_level(level)?,
            console,
            file,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), LoggerError> {
        if !self.console.enabled && !self.file.enabled {
            return Err(LoggerError::NoOutput);
        }
        self.file.validate()
    }

    /// Lowercase directive for `EnvFilter`.
    pub fn filter_directive(&self) -> String {
        self.level.as_str().to_lowercase()
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            console: ConsoleConfig::default(),
            file: FileConfig::default(),
        }
    }
}

/// Parses one of the five tracing levels, case-insensitively.
pub fn parse_level(level: &str) -> Result<Level, LoggerError> {
    Level::from_str(level.trim()).map_err(|_| LoggerError::InvalidLevel(level.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub enabled: bool,
    /// ANSI colours are only emitted when stdout is also a terminal.
    pub colored: bool,
}

impl ConsoleConfig {
    pub fn new(enabled: bool, colored: bool) -> Self {
        Self { enabled, colored }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self::new(true, true)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileConfig {
    pub enabled: bool,
    pub path: PathBuf,
    pub append: bool,
    pub format: LogFormat,
    pub rotation: RotationConfig,
}

impl FileConfig {
    pub fn new(
        enabled: bool,
        path: PathBuf,
        append: bool,
        format: LogFormat,
        rotation: RotationConfig,
    ) -> Result<Self, LoggerError> {
        let config = Self {
            enabled,
            path,
            append,
            format,
            rotation,
        };
        config.validate()?;
        Ok(config)
    }

    /// Pure validation; the writer creates missing directories on startup.
    pub fn validate(&self) -> Result<(), LoggerError> {
        if !self.enabled {
            return Ok(());
        }
        if self.path.as_os_str().is_empty() {
            return Err(LoggerError::MissingPath);
        }
        self.rotation.validate()
    }
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: PathBuf::from("logs/orgchart.log"),
            append: true,
            format: LogFormat::Json,
            rotation: RotationConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" => Ok(LogFormat::Full),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            _ => Err(LoggerError::InvalidFormat(s.to_string())),
        }
    }
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Full => "full",
            LogFormat::Compact => "compact",
            LogFormat::Json => "json",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationConfig {
    pub strategy: RotationStrategy,
    /// Size threshold in bytes for `Size` and `Combined`.
    pub max_size: u64,
    /// Rotated files kept next to the live log.
    pub max_files: usize,
}

impl RotationConfig {
    pub fn new(
        strategy: RotationStrategy,
        max_size: u64,
        max_files: usize,
    ) -> Result<Self, LoggerError> {
        let config = Self {
            strategy,
            max_size,
            max_files,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), LoggerError> {
        if self.max_size == 0 {
            return Err(LoggerError::InvalidRotation(
                "max_size must be greater than 0".to_string(),
            ));
        }
        if self.max_files == 0 {
            return Err(LoggerError::InvalidRotation(
                "max_files must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            strategy: RotationStrategy::Size,
            max_size: 10 * 1024 * 1024,
            max_files: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RotationStrategy {
    #[default]
    Size,
    Time(TimeUnit),
    /// Size threshold or daily boundary, whichever comes first.
    Combined,
}

impl FromStr for RotationStrategy {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "size" => Ok(RotationStrategy::Size),
            "combined" => Ok(RotationStrategy::Combined),
            "time" | "daily" | "time_daily" => Ok(RotationStrategy::Time(TimeUnit::Daily)),
            "hourly" | "time_hourly" => Ok(RotationStrategy::Time(TimeUnit::Hourly)),
            _ => Err(LoggerError::InvalidRotation(format!(
                "unknown strategy '{s}', expected size, daily, hourly or combined"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Hourly,
    Daily,
}

impl TimeUnit {
    pub fn duration(&self) -> Duration {
        match self {
            TimeUnit::Hourly => Duration::hours(1),
            TimeUnit::Daily => Duration::days(1),
        }
    }

    pub fn elapsed_since(&self, since: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(since) >= self.duration()
    }
}
