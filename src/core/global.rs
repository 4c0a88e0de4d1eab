//! Process-wide default logger
//!
//! Nothing is installed implicitly: call [`init`] once at startup, then reach
//! the logger from anywhere through [`logger`]. There is no teardown; flush
//! it explicitly before exiting if its writers buffer.

use super::error::{LoggerError, Result};
use super::logger::Logger;
use std::sync::OnceLock;

static DEFAULT: OnceLock<Logger> = OnceLock::new();

/// Install `logger` as the process default.
///
/// Fails with [`LoggerError::AlreadyInitialized`] on every call after the
/// first successful one; the installed logger is left untouched.
pub fn init(logger: Logger) -> Result<()> {
    DEFAULT
        .set(logger)
        .map_err(|_| LoggerError::AlreadyInitialized)
}

/// The default logger, if [`init`] has been called
pub fn logger() -> Option<&'static Logger> {
    DEFAULT.get()
}

/// Whether a default logger has been installed
pub fn is_initialized() -> bool {
    DEFAULT.get().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Level;

    #[test]
    fn test_init_once() {
        let first = Logger::new();
        first.set_level(Level::Debug);
        let _ = init(first);
        assert!(is_initialized());

        let second = Logger::new();
        assert!(matches!(init(second), Err(LoggerError::AlreadyInitialized)));
        assert!(logger().is_some());
    }
}
