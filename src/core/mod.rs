//! Core logger types and traits

pub mod config;
pub mod context;
pub mod error;
pub mod filter;
pub mod formatter;
pub mod global;
pub mod limiter;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod record;
pub mod slot;
pub mod timestamp;
pub mod writer;

pub use config::{Config, ConfigFile, Flags};
pub use context::{dynamic, Attributes, ContextArg, Dynamic, DynamicRef};
pub use error::{LoggerError, Result};
pub use filter::{and, filter_fn, not, or, Filter, FilterRef};
pub use formatter::{Formatter, NullFormatter};
pub use limiter::{CountLimiter, LimiterState, Locator, TimeLimiter, TimeQueue};
pub use log_level::Level;
pub use logger::{Logger, LoggerBuilder, Shared, SharedState};
pub use metrics::LoggerMetrics;
pub use record::{Aux, CallSite, Context, Record};
pub use slot::{Slot, SlotLink, SlotTable};
pub use timestamp::TimestampFormat;
pub use writer::{NullWriter, Writer};
