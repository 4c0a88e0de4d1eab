//! Writer implementations

pub mod async_writer;
pub mod console;
pub mod file;

pub use async_writer::{AsyncWriter, DEFAULT_QUEUE_CAPACITY, DEFAULT_SHUTDOWN_TIMEOUT};
pub use console::ConsoleWriter;
pub use file::FileWriter;

// Re-export the trait alongside its implementations
pub use crate::core::{NullWriter, Writer};
