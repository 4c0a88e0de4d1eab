//! Console writer implementation

use crate::core::{Level, Record, Result, Writer};
use std::io::{self, Write};

/// Writes formatted records to stdout, or to stderr for `Error` and above.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleWriter {
    stderr_level: Level,
}

impl ConsoleWriter {
    pub fn new() -> Self {
        Self {
            stderr_level: Level::Error,
        }
    }

    /// Send everything to stderr
    pub fn stderr() -> Self {
        Self {
            stderr_level: Level::Trace,
        }
    }

    /// Records at or above `level` go to stderr; `Level::Off` keeps all on stdout
    #[must_use]
    pub fn with_stderr_level(mut self, level: Level) -> Self {
        self.stderr_level = level;
        self
    }

    pub fn uses_stderr(&self, level: Level) -> bool {
        self.stderr_level.admits(level)
    }
}

impl Default for ConsoleWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl Writer for ConsoleWriter {
    fn write(&self, bytes: &[u8], record: &Record) -> Result<()> {
        if self.uses_stderr(record.level) {
            io::stderr().lock().write_all(bytes)?;
        } else {
            io::stdout().lock().write_all(bytes)?;
        }
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        // Flush both stdout and stderr since we write to both
        io::stdout().flush()?;
        io::stderr().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}
