//! Formatter trait for rendering records to bytes

use super::{error::Result, record::Record};

/// Renders a record into the bytes a [`Writer`](super::writer::Writer)
/// receives.
///
/// A formatter linked into several slots is called only once per emission;
/// every slot sharing the same `Arc` receives the same bytes.
pub trait Formatter: Send + Sync {
    fn format(&self, record: &Record) -> Result<Vec<u8>>;
    fn name(&self) -> &str;
}

/// Formatter producing no output, for slots that only need the record.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullFormatter;

impl Formatter for NullFormatter {
    fn format(&self, _record: &Record) -> Result<Vec<u8>> {
        Ok(Vec::new())
    }

    fn name(&self) -> &str {
        "null"
    }
}
