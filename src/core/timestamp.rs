//! Timestamp formatting utilities
//!
//! Supports ISO 8601, RFC 3339, Unix timestamps, and custom formats.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Standardized timestamp format options
///
/// # Examples
///
/// ```
/// use rust_slot_logger::TimestampFormat;
/// use chrono::Utc;
///
/// let timestamp = TimestampFormat::Iso8601.format(&Utc::now());
/// assert!(timestamp.ends_with('Z'));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// ISO 8601 with milliseconds: `2025-01-08T10:30:45.123Z`
    #[default]
    Iso8601,

    /// ISO 8601 with microseconds: `2025-01-08T10:30:45.123456Z`
    Iso8601Micros,

    /// RFC 3339 format: `2025-01-08T10:30:45+00:00`
    Rfc3339,

    /// Unix timestamp in seconds: `1736332245`
    Unix,

    /// Unix timestamp in milliseconds: `1736332245123`
    UnixMillis,

    /// Custom strftime format, e.g. `"%d/%b/%Y:%H:%M:%S %z"`
    ///
    /// A pattern chrono cannot parse renders as [`Iso8601`](Self::Iso8601).
    Custom(String),
}

impl TimestampFormat {
    /// Format a `DateTime<Utc>` according to this format
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Utc>) -> String {
        match self {
            TimestampFormat::Iso8601 => datetime.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            TimestampFormat::Iso8601Micros => datetime.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string(),
            TimestampFormat::Rfc3339 => datetime.to_rfc3339(),
            TimestampFormat::Unix => datetime.timestamp().to_string(),
            TimestampFormat::UnixMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::Custom(format_str) if Self::is_valid_pattern(format_str) => {
                datetime.format(format_str).to_string()
            }
            TimestampFormat::Custom(_) => TimestampFormat::Iso8601.format(datetime),
        }
    }

    /// Whether `format_str` is a strftime pattern chrono can render
    #[must_use]
    pub fn is_valid_pattern(format_str: &str) -> bool {
        !StrftimeItems::new(format_str).any(|item| matches!(item, Item::Error))
    }

    /// Check if this is a Unix-based numeric format
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, TimestampFormat::Unix | TimestampFormat::UnixMillis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).unwrap()
    }

    #[test]
    fn test_formats() {
        let dt = sample();
        assert_eq!(TimestampFormat::Iso8601.format(&dt), "2025-01-08T10:30:45.000Z");
        assert_eq!(
            TimestampFormat::Iso8601Micros.format(&dt),
            "2025-01-08T10:30:45.000000Z"
        );
        assert_eq!(TimestampFormat::Rfc3339.format(&dt), "2025-01-08T10:30:45+00:00");
        assert_eq!(TimestampFormat::Unix.format(&dt), "1736332245");
        assert_eq!(TimestampFormat::UnixMillis.format(&dt), "1736332245000");
        assert_eq!(
            TimestampFormat::Custom("%Y-%m-%d".to_string()).format(&dt),
            "2025-01-08"
        );
    }

    #[test]
    fn test_invalid_custom_pattern_falls_back() {
        let dt = sample();
        assert!(!TimestampFormat::is_valid_pattern("%Y-%Q"));
        assert!(TimestampFormat::is_valid_pattern("%d/%b/%Y"));
        assert_eq!(
            TimestampFormat::Custom("%Y-%Q".to_string()).format(&dt),
            "2025-01-08T10:30:45.000Z"
        );
    }

    #[test]
    fn test_is_numeric() {
        assert!(TimestampFormat::Unix.is_numeric());
        assert!(!TimestampFormat::Rfc3339.is_numeric());
    }
}
