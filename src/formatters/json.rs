//! JSON lines formatter

use crate::core::{Formatter, Record, Result, TimestampFormat};
use serde_json::{Map, Value};

/// Renders each record as one JSON object followed by a newline.
///
/// Keys: `time`, `level`, `file`, `line`, `module`, `function`, `message`,
/// plus `prefix` and `marked` when set and a `context` array of
/// `{"key", "value"}` objects, in record order, when the record carries
/// key/value pairs. Repeated keys are all kept.
///
/// # Example
///
/// ```
/// use rust_slot_logger::{CallSite, Formatter, JsonFormatter, Level, Record};
///
/// let record = Record::new(Level::Info, "ready", CallSite::new("main.rs", 3, "app", "app::main"));
/// let bytes = JsonFormatter::new().format(&record).unwrap();
/// let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
/// assert_eq!(value["message"], "ready");
/// ```
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    timestamp_format: TimestampFormat,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Numeric formats are emitted as JSON numbers
    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    fn timestamp_value(&self, record: &Record) -> Value {
        match self.timestamp_format {
            TimestampFormat::Unix => Value::from(record.time.timestamp()),
            TimestampFormat::UnixMillis => Value::from(record.time.timestamp_millis()),
            _ => Value::String(self.timestamp_format.format(&record.time)),
        }
    }

    /// Build the JSON object for a record
    pub fn to_value(&self, record: &Record) -> Value {
        let mut obj = Map::new();

        obj.insert("time".to_string(), self.timestamp_value(record));
        obj.insert("level".to_string(), Value::from(record.level.to_str()));
        obj.insert("file".to_string(), Value::from(record.file));
        obj.insert("line".to_string(), Value::from(record.line));
        obj.insert("module".to_string(), Value::from(record.module_path));
        obj.insert("function".to_string(), Value::from(record.function));
        obj.insert("message".to_string(), Value::from(record.message.as_str()));

        let aux = &record.aux;
        if !aux.prefix.is_empty() {
            obj.insert("prefix".to_string(), Value::from(aux.prefix.as_str()));
        }
        if aux.marked {
            obj.insert("marked".to_string(), Value::Bool(true));
        }
        if !aux.contexts.is_empty() {
            let context: Vec<Value> = aux
                .contexts
                .iter()
                .map(|c| serde_json::json!({ "key": c.key, "value": c.value }))
                .collect();
            obj.insert("context".to_string(), Value::Array(context));
        }

        Value::Object(obj)
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, record: &Record) -> Result<Vec<u8>> {
        let mut bytes = serde_json::to_vec(&self.to_value(record))?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    fn name(&self) -> &str {
        "json"
    }
}
