//! Error types for the logger system

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Writer error (generic)
    #[error("Writer error: {0}")]
    WriterError(String),

    /// Formatter error with format type
    #[error("Formatter error ({format_type}): {message}")]
    FormatterError {
        format_type: String,
        message: String,
    },

    /// Async queue full, record dropped
    #[error("Writer queue full: {current}/{max} records buffered")]
    QueueFull { current: usize, max: usize },

    /// Channel send error
    #[error("Failed to send record to async worker")]
    ChannelSendError,

    /// Writer already shut down
    #[error("Writer already stopped")]
    LoggerStopped,

    /// The process-wide default logger was set twice
    #[error("Default logger already initialized")]
    AlreadyInitialized,

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a queue full error with buffer details
    pub fn queue_full(current: usize, max: usize) -> Self {
        LoggerError::QueueFull { current, max }
    }

    /// Create a formatter error
    pub fn formatter(format_type: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FormatterError {
            format_type: format_type.into(),
            message: message.into(),
        }
    }

    /// Create a writer error (generic)
    pub fn writer<S: Into<String>>(msg: S) -> Self {
        LoggerError::WriterError(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }
}
