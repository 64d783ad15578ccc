//! Logging setup for wmfdb tools.
//!
//! Levels use the classic syslog-style names operators pass on the command
//! line (`--log=DEBUG`), and map onto `tracing` levels.

use std::fmt;
use std::str::FromStr;

use tracing::level_filters::LevelFilter;

use crate::error::{Result, WmfdbError};

/// A logging level, by name or numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    NotSet,
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// Numeric value of the level.
    pub const fn value(self) -> u8 {
        match self {
            Self::NotSet => 0,
            Self::Debug => 10,
            Self::Info => 20,
            Self::Warning => 30,
            Self::Error => 40,
            Self::Critical => 50,
        }
    }

    /// The most verbose `tracing` level this level lets through.
    pub const fn filter(self) -> LevelFilter {
        match self {
            Self::NotSet => LevelFilter::TRACE,
            Self::Debug => LevelFilter::DEBUG,
            Self::Info => LevelFilter::INFO,
            Self::Warning => LevelFilter::WARN,
            Self::Error | Self::Critical => LevelFilter::ERROR,
        }
    }

    /// The level with numeric value `value`, if there is one.
    pub const fn from_value(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::NotSet),
            10 => Some(Self::Debug),
            20 => Some(Self::Info),
            30 => Some(Self::Warning),
            40 => Some(Self::Error),
            50 => Some(Self::Critical),
            _ => None,
        }
    }
}

impl FromStr for LogLevel {
    type Err = WmfdbError;

    /// Level names are case-sensitive.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "NOTSET" => Ok(Self::NotSet),
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARN" | "WARNING" => Ok(Self::Warning),
            "ERROR" => Ok(Self::Error),
            "CRITICAL" | "FATAL" => Ok(Self::Critical),
            _ => Err(WmfdbError::value(format!("Invalid logging level '{s}'"))),
        }
    }
}

impl TryFrom<i64> for LogLevel {
    type Error = WmfdbError;

    fn try_from(value: i64) -> Result<Self> {
        Self::from_value(value)
            .ok_or_else(|| WmfdbError::value(format!("Invalid logging level '{value}'")))
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotSet => "NOTSET",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        };
        f.write_str(name)
    }
}

/// Install the process-wide logger, writing to stderr.
///
/// Lines carry a timestamp, level, target and line number. Calling this
/// again after a logger is installed has no effect.
pub fn setup(level: LogLevel) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level.filter())
        .with_target(true)
        .with_line_number(true)
        .try_init()
        .ok(); // a logger is already installed
}

/// Parse `level` and install the logger.
pub fn setup_from_str(level: &str) -> Result<()> {
    setup(level.parse()?);
    Ok(())
}
