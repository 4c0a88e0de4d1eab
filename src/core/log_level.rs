//! Log level definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a record, and threshold for loggers and slots.
///
/// `Off` sorts above every record level, so a threshold of `Off`
/// admits nothing. Records are never emitted at `Off`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub enum Level {
    Trace = 0,
    Debug = 1,
    #[default]
    Info = 2,
    Warn = 3,
    Error = 4,
    Panic = 5,
    Fatal = 6,
    Off = 7,
}

impl Level {
    /// Every level that a record can carry, lowest first.
    pub const RECORD_LEVELS: [Level; 7] = [
        Level::Trace,
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Panic,
        Level::Fatal,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Panic => "PANIC",
            Level::Fatal => "FATAL",
            Level::Off => "OFF",
        }
    }

    /// Whether a threshold of `self` lets a record at `level` through.
    #[inline]
    pub fn admits(&self, level: Level) -> bool {
        *self <= level
    }

    #[cfg(feature = "console")]
    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            Level::Trace => BrightBlack,
            Level::Debug => Blue,
            Level::Info => Green,
            Level::Warn => Yellow,
            Level::Error => Red,
            Level::Panic | Level::Fatal => BrightRed,
            Level::Off => White,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "TRACE" => Ok(Level::Trace),
            "DEBUG" => Ok(Level::Debug),
            "INFO" => Ok(Level::Info),
            "WARN" | "WARNING" => Ok(Level::Warn),
            "ERROR" => Ok(Level::Error),
            "PANIC" => Ok(Level::Panic),
            "FATAL" => Ok(Level::Fatal),
            "OFF" | "NONE" => Ok(Level::Off),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_off_admits_nothing() {
        for level in Level::RECORD_LEVELS {
            assert!(!Level::Off.admits(level));
            assert!(Level::Trace.admits(level));
        }
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("warning".parse::<Level>(), Ok(Level::Warn));
        assert_eq!("none".parse::<Level>(), Ok(Level::Off));
        assert!("verbose".parse::<Level>().is_err());
    }
}
