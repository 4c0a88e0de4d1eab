//! Writer trait for log output destinations

use super::{error::Result, record::Record};

/// Consumes formatted bytes together with the record they came from.
///
/// Writers are called inline, under the logger lock, in slot order. A
/// writer that must not stall its callers should queue internally, as
/// [`AsyncWriter`](crate::writers::AsyncWriter) does.
pub trait Writer: Send + Sync {
    fn write(&self, bytes: &[u8], record: &Record) -> Result<()>;

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str;
}

/// Writer discarding everything it is given.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullWriter;

impl Writer for NullWriter {
    fn write(&self, _bytes: &[u8], _record: &Record) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "null"
    }
}
