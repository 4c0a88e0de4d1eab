//! Formatter implementations

pub mod json;
pub mod text;

pub use json::JsonFormatter;
pub use text::TextFormatter;

// Re-export the trait alongside its implementations
pub use crate::core::{Formatter, NullFormatter};
