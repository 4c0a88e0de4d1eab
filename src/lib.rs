//! # Rust Slot Logger
//!
//! A structured logging library with per-call-site context, eight-way
//! fan-out and call-site rate limiting.
//!
//! ## Features
//!
//! - **Slots**: up to eight (formatter, writer, level, filter) destinations per
//!   logger, with each distinct formatter run once per record
//! - **Derived loggers**: cheap handles adding a prefix, key/value context
//!   (static or evaluated per record), a mark or a rate limit
//! - **Rate limiting**: count-based and sliding time window, keyed by call site
//! - **Thread Safe**: records from one logger family are written in a total
//!   order, never interleaved
//!
//! ## Example
//!
//! ```
//! use rust_slot_logger::prelude::*;
//! use rust_slot_logger::{context_args, info};
//! use std::sync::Arc;
//!
//! let logger = Logger::builder()
//!     .level(Level::Debug)
//!     .link(
//!         Slot::S0,
//!         SlotLink::new(Arc::new(TextFormatter::new()), Arc::new(ConsoleWriter::new())),
//!     )
//!     .build();
//!
//! let db = logger.with_prefix("db").with_context(context_args!["pool", 4]);
//! info!(db, "connected in {} ms", 12);
//! ```

pub mod core;
pub mod formatters;
pub mod macros;
pub mod writers;

pub mod prelude {
    pub use crate::core::{
        dynamic, CallSite, Config, ContextArg, Filter, FilterRef, Flags, Formatter, Level,
        Logger, LoggerBuilder, LoggerError, LoggerMetrics, NullFormatter, NullWriter, Record,
        Result, Slot, SlotLink, TimestampFormat, Writer,
    };
    pub use crate::formatters::{JsonFormatter, TextFormatter};
    pub use crate::writers::{AsyncWriter, ConsoleWriter, FileWriter};
}

pub use crate::core::{
    and, dynamic, filter_fn, global, not, or, Attributes, Aux, CallSite, Config, ConfigFile,
    Context, ContextArg, CountLimiter, Dynamic, DynamicRef, Filter, FilterRef, Flags, Formatter,
    Level, LimiterState, Locator, Logger, LoggerBuilder, LoggerError, LoggerMetrics,
    NullFormatter, NullWriter, Record, Result, Slot, SlotLink, SlotTable, TimeLimiter,
    TimeQueue, TimestampFormat, Writer,
};
pub use formatters::{JsonFormatter, TextFormatter};
pub use writers::{
    AsyncWriter, ConsoleWriter, FileWriter, DEFAULT_QUEUE_CAPACITY, DEFAULT_SHUTDOWN_TIMEOUT,
};
