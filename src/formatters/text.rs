//! Human-readable text formatter

use crate::core::{Formatter, Record, Result, TimestampFormat};
#[cfg(feature = "console")]
use colored::Colorize;

/// Renders records as single text lines:
///
/// ```text
/// [2025-01-08T10:30:45.123Z] [INFO ] db connected host=10.0.0.1 *
/// ```
///
/// The prefix follows the level, contexts and the `*` mark follow the
/// message. Multi-line messages (for example with a stack trace) are written
/// as is.
#[derive(Debug, Clone)]
pub struct TextFormatter {
    timestamp_format: TimestampFormat,
    show_location: bool,
    #[cfg(feature = "console")]
    use_colors: bool,
}

impl TextFormatter {
    pub fn new() -> Self {
        Self {
            timestamp_format: TimestampFormat::default(),
            show_location: false,
            #[cfg(feature = "console")]
            use_colors: false,
        }
    }

    /// Set the timestamp format for this formatter
    ///
    /// # Examples
    ///
    /// ```
    /// use rust_slot_logger::{TextFormatter, TimestampFormat};
    ///
    /// let formatter = TextFormatter::new()
    ///     .with_timestamp_format(TimestampFormat::Iso8601Micros);
    /// ```
    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Set a custom timestamp format using a strftime-compatible format string
    ///
    /// An unparsable pattern is reported on stderr and the current format is
    /// kept.
    #[must_use]
    pub fn with_custom_timestamp(mut self, format_str: &str) -> Self {
        if TimestampFormat::is_valid_pattern(format_str) {
            self.timestamp_format = TimestampFormat::Custom(format_str.to_string());
        } else {
            eprintln!(
                "[LOGGER WARNING] Invalid timestamp pattern '{}', keeping {:?}",
                format_str, self.timestamp_format
            );
        }
        self
    }

    /// Append `(file:line)` to every line that has a call site
    #[must_use]
    pub fn with_location(mut self, show_location: bool) -> Self {
        self.show_location = show_location;
        self
    }

    /// Colour the level tag with ANSI escapes
    #[cfg(feature = "console")]
    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    fn level_tag(&self, record: &Record) -> String {
        let tag = format!("{:5}", record.level.to_str());

        #[cfg(feature = "console")]
        if self.use_colors {
            return tag.color(record.level.color_code()).to_string();
        }

        tag
    }

    /// Format a record as a line without the trailing newline
    pub fn format_line(&self, record: &Record) -> String {
        let mut line = format!(
            "[{}] [{}] ",
            self.timestamp_format.format(&record.time),
            self.level_tag(record)
        );

        if !record.aux.prefix.is_empty() {
            line.push_str(&record.aux.prefix);
            line.push(' ');
        }
        line.push_str(&record.message);

        if !record.aux.contexts.is_empty() {
            line.push(' ');
            line.push_str(&record.aux.format_contexts());
        }
        if record.aux.marked {
            line.push_str(" *");
        }
        if self.show_location && !record.file.is_empty() {
            line.push_str(&format!(" ({}:{})", record.file, record.line));
        }

        line
    }
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for TextFormatter {
    fn format(&self, record: &Record) -> Result<Vec<u8>> {
        let mut line = self.format_line(record);
        line.push('\n');
        Ok(line.into_bytes())
    }

    fn name(&self) -> &str {
        "text"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Aux, CallSite, Context, Level};
    use chrono::{TimeZone, Utc};

    fn record(aux: Aux) -> Record {
        Record::new(
            Level::Warn,
            "disk almost full",
            CallSite::new("src/disk.rs", 17, "app::disk", "app::disk::check"),
        )
        .with_time(Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).unwrap())
        .with_aux(aux)
    }

    #[test]
    fn test_plain_line() {
        let out = TextFormatter::new().format(&record(Aux::default())).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "[2025-01-08T10:30:45.000Z] [WARN ] disk almost full\n"
        );
    }

    #[test]
    fn test_aux_and_location() {
        let aux = Aux {
            prefix: "storage".to_string(),
            contexts: vec![Context::new("mount", "/var"), Context::new("used", "97%")],
            marked: true,
        };
        let line = TextFormatter::new()
            .with_timestamp_format(TimestampFormat::Unix)
            .with_location(true)
            .format_line(&record(aux));

        assert_eq!(
            line,
            "[1736332245] [WARN ] storage disk almost full mount=/var used=97% * (src/disk.rs:17)"
        );
    }

    #[test]
    fn test_location_skipped_without_call_site() {
        let mut r = record(Aux::default());
        r.file = "";
        let line = TextFormatter::new().with_location(true).format_line(&r);
        assert!(line.ends_with("disk almost full"));
    }

    #[test]
    fn test_custom_timestamp_pattern() {
        let line = TextFormatter::new()
            .with_custom_timestamp("%d/%m/%Y")
            .format_line(&record(Aux::default()));
        assert!(line.starts_with("[08/01/2025] [WARN ]"));
    }

    #[test]
    fn test_invalid_custom_timestamp_keeps_current_format() {
        let formatter = TextFormatter::new()
            .with_timestamp_format(TimestampFormat::Unix)
            .with_custom_timestamp("%Y %Q");
        assert_eq!(formatter.timestamp_format, TimestampFormat::Unix);

        let line = formatter.format_line(&record(Aux::default()));
        assert_eq!(line, "[1736332245] [WARN ] disk almost full");
    }
}
