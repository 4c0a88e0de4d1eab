//! Record structure and call-site metadata

use super::limiter::Locator;
use super::log_level::Level;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::Location;

/// Source position of a log statement.
///
/// Methods on [`Logger`](crate::Logger) capture the file and line through
/// `#[track_caller]`; the logging macros also fill in the module path and
/// the enclosing function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CallSite {
    pub file: &'static str,
    pub line: u32,
    pub module_path: &'static str,
    pub function: &'static str,
}

impl CallSite {
    pub const fn new(
        file: &'static str,
        line: u32,
        module_path: &'static str,
        function: &'static str,
    ) -> Self {
        Self {
            file,
            line,
            module_path,
            function,
        }
    }

    /// Call site of whoever called the current `#[track_caller]` function.
    #[track_caller]
    pub fn caller() -> Self {
        Self::from_location(Location::caller())
    }

    pub fn from_location(location: &'static Location<'static>) -> Self {
        Self {
            file: location.file(),
            line: location.line(),
            module_path: "",
            function: "",
        }
    }

    pub fn locator(&self) -> Locator {
        Locator::new(self.file, self.line)
    }
}

/// One key/value pair attached to a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    pub key: String,
    pub value: String,
}

impl Context {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Attributes a derived logger adds to every record it emits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Aux {
    pub prefix: String,
    pub contexts: Vec<Context>,
    pub marked: bool,
}

impl Aux {
    pub fn is_empty(&self) -> bool {
        self.prefix.is_empty() && self.contexts.is_empty() && !self.marked
    }

    /// Format contexts as space separated key=value pairs
    pub fn format_contexts(&self) -> String {
        self.contexts
            .iter()
            .map(Context::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A single log event as seen by formatters and writers.
///
/// Built fresh for every emission and only ever lent out by shared
/// reference, so formatters and writers cannot alter it.
#[derive(Debug, Clone, Serialize)]
pub struct Record {
    pub time: DateTime<Utc>,
    pub level: Level,
    pub file: &'static str,
    pub line: u32,
    pub module_path: &'static str,
    pub function: &'static str,
    pub message: String,
    pub aux: Aux,
}

impl Record {
    pub fn new(level: Level, message: impl Into<String>, site: CallSite) -> Self {
        Self {
            time: Utc::now(),
            level,
            file: site.file,
            line: site.line,
            module_path: site.module_path,
            function: site.function,
            message: message.into(),
            aux: Aux::default(),
        }
    }

    #[must_use]
    pub fn with_time(mut self, time: DateTime<Utc>) -> Self {
        self.time = time;
        self
    }

    #[must_use]
    pub fn with_aux(mut self, aux: Aux) -> Self {
        self.aux = aux;
        self
    }

    pub fn locator(&self) -> Locator {
        Locator::new(self.file, self.line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_site_caller() {
        let site = CallSite::caller();
        assert!(site.file.ends_with("record.rs"));
        assert_eq!(site.line, line!() - 2);
        assert!(site.module_path.is_empty());
    }

    #[test]
    fn test_record_locator_matches_site() {
        let site = CallSite::new("src/main.rs", 42, "app", "app::main");
        let record = Record::new(Level::Info, "hello", site);

        assert_eq!(record.locator(), site.locator());
        assert_eq!(record.function, "app::main");
        assert!(record.aux.is_empty());
    }

    #[test]
    fn test_aux_format_contexts() {
        let aux = Aux {
            prefix: String::new(),
            contexts: vec![Context::new("user", "alice"), Context::new("req", "7")],
            marked: false,
        };
        assert_eq!(aux.format_contexts(), "user=alice req=7");
        assert!(!aux.is_empty());
    }
}
