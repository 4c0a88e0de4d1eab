//! Main logger implementation
//!
//! A [`Logger`] is a cheap handle. Cloning it, or deriving a variant with
//! [`with_prefix`](Logger::with_prefix) and friends, yields a handle onto the
//! same root: the same config, slot table, limiter state and metrics, all
//! behind one mutex. Only the attribute block (prefix, contexts, mark,
//! limiters) is per handle.
//!
//! # Ordering
//!
//! The root mutex is held from the filter and limiter checks through the
//! last writer call of an emission. Writes from loggers sharing a root are
//! therefore totally ordered and never interleave, at the price of
//! serializing all output through one lock. A slow writer stalls every
//! caller unless it queues internally.
//!
//! Filters, dynamic getters, formatters and writers run under that lock and
//! must never call back into the logger.

use super::{
    config::{Config, ConfigFile, Flags},
    context::{parse_context_args, Attributes, ContextArg},
    error::Result,
    filter::FilterRef,
    formatter::Formatter,
    limiter::{CountLimiter, LimiterState, TimeLimiter},
    log_level::Level,
    metrics::LoggerMetrics,
    record::{CallSite, Record},
    slot::{Slot, SlotLink, SlotTable},
    writer::Writer,
};
use parking_lot::Mutex;
use std::backtrace::Backtrace;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// State owned by a root logger and shared by all loggers derived from it.
#[derive(Debug, Default)]
pub struct Shared {
    config: Config,
    slots: SlotTable,
    limits: LimiterState,
}

/// Handle to the state shared across a logger family.
pub type SharedState = Arc<Mutex<Shared>>;

#[derive(Clone)]
pub struct Logger {
    shared: SharedState,
    metrics: Arc<LoggerMetrics>,
    attrs: Arc<Attributes>,
}

impl Logger {
    /// A logger with default config and all eight slots unlinked.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                config,
                ..Default::default()
            })),
            metrics: Arc::new(LoggerMetrics::new()),
            attrs: Arc::new(Attributes::default()),
        }
    }

    /// Whether `self` and `other` share config, slots and limiter state.
    pub fn shares_root_with(&self, other: &Logger) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    /// Get the logger metrics for detailed observability
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attrs
    }

    // ------------------------------------------------------------------
    // Config
    // ------------------------------------------------------------------

    pub fn config(&self) -> Config {
        self.shared.lock().config.clone()
    }

    pub fn set_config(&self, config: Config) {
        self.shared.lock().config = config;
    }

    /// Replace the config with `transform(current)` in one critical section.
    ///
    /// ```
    /// use rust_slot_logger::{Flags, Level, Logger};
    ///
    /// let logger = Logger::new();
    /// logger.update_config(|mut c| {
    ///     c.level = Level::Debug;
    ///     c.disabled.insert(Flags::RUNTIME);
    ///     c
    /// });
    /// assert_eq!(logger.level(), Level::Debug);
    /// ```
    pub fn update_config<F>(&self, transform: F)
    where
        F: FnOnce(Config) -> Config,
    {
        let mut shared = self.shared.lock();
        let current = std::mem::take(&mut shared.config);
        shared.config = transform(current);
    }

    /// Overlay a deserialized config file onto the current config.
    pub fn apply_config_file(&self, file: &ConfigFile) -> Result<()> {
        let mut shared = self.shared.lock();
        shared.config = file.apply(shared.config.clone())?;
        Ok(())
    }

    pub fn level(&self) -> Level {
        self.shared.lock().config.level
    }

    pub fn set_level(&self, level: Level) {
        self.shared.lock().config.level = level;
    }

    pub fn track_level(&self) -> Level {
        self.shared.lock().config.track_level
    }

    pub fn set_track_level(&self, level: Level) {
        self.shared.lock().config.track_level = level;
    }

    pub fn exit_level(&self) -> Level {
        self.shared.lock().config.exit_level
    }

    pub fn set_exit_level(&self, level: Level) {
        self.shared.lock().config.exit_level = level;
    }

    pub fn timing_level(&self) -> Level {
        self.shared.lock().config.timing_level
    }

    pub fn set_timing_level(&self, level: Level) {
        self.shared.lock().config.timing_level = level;
    }

    pub fn panic_level(&self) -> Level {
        self.shared.lock().config.panic_level
    }

    pub fn set_panic_level(&self, level: Level) {
        self.shared.lock().config.panic_level = level;
    }

    pub fn filter(&self) -> Option<FilterRef> {
        self.shared.lock().config.filter.clone()
    }

    pub fn set_filter(&self, filter: Option<FilterRef>) {
        self.shared.lock().config.filter = filter;
    }

    pub fn disabled(&self) -> Flags {
        self.shared.lock().config.disabled
    }

    pub fn set_disabled(&self, flags: Flags) {
        self.shared.lock().config.disabled = flags;
    }

    /// Whether a record at `level` would pass the logger's own threshold
    pub fn enabled(&self, level: Level) -> bool {
        level != Level::Off && self.level().admits(level)
    }

    // ------------------------------------------------------------------
    // Slots
    // ------------------------------------------------------------------

    pub fn link(&self, slot: Slot, link: SlotLink) {
        self.shared.lock().slots.link(slot, link);
    }

    pub fn unlink(&self, slot: Slot) {
        self.shared.lock().slots.unlink(slot);
    }

    pub fn unlink_all(&self) {
        self.shared.lock().slots.unlink_all();
    }

    pub fn copy_slot(&self, dst: Slot, src: Slot) {
        self.shared.lock().slots.copy(dst, src);
    }

    /// Copy `from` into `to`, then reset `from` to the null state
    pub fn move_slot(&self, to: Slot, from: Slot) {
        self.shared.lock().slots.move_slot(to, from);
    }

    pub fn swap_slot(&self, a: Slot, b: Slot) {
        self.shared.lock().slots.swap(a, b);
    }

    pub fn has_link(&self, slot: Slot) -> bool {
        self.shared.lock().slots.has_link(slot)
    }

    pub fn slot_link(&self, slot: Slot) -> Option<SlotLink> {
        self.shared.lock().slots.get(slot).cloned()
    }

    pub fn slot_level(&self, slot: Slot) -> Level {
        self.shared.lock().slots.level(slot)
    }

    /// Change the threshold of a linked slot. Returns false if unlinked.
    pub fn set_slot_level(&self, slot: Slot, level: Level) -> bool {
        self.shared.lock().slots.set_level(slot, level)
    }

    pub fn slot_formatter(&self, slot: Slot) -> Option<Arc<dyn Formatter>> {
        self.shared.lock().slots.get(slot).map(|l| Arc::clone(l.formatter()))
    }

    pub fn slot_writer(&self, slot: Slot) -> Option<Arc<dyn Writer>> {
        self.shared.lock().slots.get(slot).map(|l| Arc::clone(l.writer()))
    }

    pub fn slot_filter(&self, slot: Slot) -> Option<FilterRef> {
        self.shared.lock().slots.get(slot).and_then(|l| l.filter().cloned())
    }

    /// Flush every linked writer
    pub fn flush(&self) -> Result<()> {
        self.shared.lock().slots.flush()
    }

    // ------------------------------------------------------------------
    // Derived loggers
    // ------------------------------------------------------------------

    fn derive(&self, change: impl FnOnce(&mut Attributes)) -> Logger {
        let mut attrs = Attributes::clone(&self.attrs);
        change(&mut attrs);
        Logger {
            shared: Arc::clone(&self.shared),
            metrics: Arc::clone(&self.metrics),
            attrs: Arc::new(attrs),
        }
    }

    /// A logger whose records carry `prefix`. `self` is unchanged.
    #[must_use]
    pub fn with_prefix(&self, prefix: impl Into<String>) -> Logger {
        let prefix = prefix.into();
        self.derive(|attrs| attrs.prefix = prefix)
    }

    /// A logger with extra key/value pairs appended to this one's.
    ///
    /// `kvs` is a flattened `key, value, key, value, ...` list, usually
    /// built with [`context_args!`](crate::context_args). Plain values are
    /// stringified now; values made with [`dynamic`](crate::dynamic) are
    /// evaluated on every emission. An odd trailing key is dropped.
    #[must_use]
    pub fn with_context(&self, kvs: impl IntoIterator<Item = ContextArg>) -> Logger {
        let (statics, dynamics) = parse_context_args(kvs);
        self.derive(|attrs| {
            attrs.static_contexts.extend(statics);
            attrs.dynamic_contexts.extend(dynamics);
        })
    }

    #[must_use]
    pub fn with_mark(&self, marked: bool) -> Logger {
        self.derive(|attrs| attrs.marked = marked)
    }

    /// A logger keeping `limit` out of every `batch` records per call site.
    pub fn with_count_limit(&self, batch: i64, limit: i64) -> Result<Logger> {
        let limiter = CountLimiter::new(batch, limit)?;
        Ok(self.derive(|attrs| attrs.count_limiter = Some(limiter)))
    }

    /// A logger keeping at most `limit` records per call site per `duration`.
    pub fn with_time_limit(&self, duration: Duration, limit: i64) -> Result<Logger> {
        let limiter = TimeLimiter::new(duration, limit)?;
        Ok(self.derive(|attrs| attrs.time_limiter = Some(limiter)))
    }

    /// Number of call sites with rate-limiter history on this root
    pub fn tracked_call_sites(&self) -> usize {
        self.shared.lock().limits.tracked_sites()
    }

    /// Forget all rate-limiter history on this root
    pub fn reset_limits(&self) {
        self.shared.lock().limits.clear();
    }

    // ------------------------------------------------------------------
    // Emission
    // ------------------------------------------------------------------

    #[track_caller]
    pub fn log(&self, level: Level, message: impl Into<String>) {
        self.emit(CallSite::caller(), level, || message.into());
    }

    /// Log pre-formatted arguments; nothing is formatted below the threshold.
    #[track_caller]
    pub fn log_fmt(&self, level: Level, args: fmt::Arguments<'_>) {
        self.emit(CallSite::caller(), level, || fmt::format(args));
    }

    /// Log with an explicit call site, as the macros do.
    pub fn log_at(&self, site: CallSite, level: Level, args: fmt::Arguments<'_>) {
        self.emit(site, level, || fmt::format(args));
    }

    #[inline]
    #[track_caller]
    pub fn trace(&self, message: impl Into<String>) {
        self.log(Level::Trace, message);
    }

    #[inline]
    #[track_caller]
    pub fn debug(&self, message: impl Into<String>) {
        self.log(Level::Debug, message);
    }

    #[inline]
    #[track_caller]
    pub fn info(&self, message: impl Into<String>) {
        self.log(Level::Info, message);
    }

    #[inline]
    #[track_caller]
    pub fn warn(&self, message: impl Into<String>) {
        self.log(Level::Warn, message);
    }

    #[inline]
    #[track_caller]
    pub fn error(&self, message: impl Into<String>) {
        self.log(Level::Error, message);
    }

    /// Log at `Fatal`. Terminates the process if the exit level admits it.
    #[inline]
    #[track_caller]
    pub fn fatal(&self, message: impl Into<String>) {
        self.log(Level::Fatal, message);
    }

    #[inline]
    #[track_caller]
    pub fn trace_fmt(&self, args: fmt::Arguments<'_>) {
        self.log_fmt(Level::Trace, args);
    }

    #[inline]
    #[track_caller]
    pub fn debug_fmt(&self, args: fmt::Arguments<'_>) {
        self.log_fmt(Level::Debug, args);
    }

    #[inline]
    #[track_caller]
    pub fn info_fmt(&self, args: fmt::Arguments<'_>) {
        self.log_fmt(Level::Info, args);
    }

    #[inline]
    #[track_caller]
    pub fn warn_fmt(&self, args: fmt::Arguments<'_>) {
        self.log_fmt(Level::Warn, args);
    }

    #[inline]
    #[track_caller]
    pub fn error_fmt(&self, args: fmt::Arguments<'_>) {
        self.log_fmt(Level::Error, args);
    }

    #[inline]
    #[track_caller]
    pub fn fatal_fmt(&self, args: fmt::Arguments<'_>) {
        self.log_fmt(Level::Fatal, args);
    }

    /// Log at the panic level, then panic with `message`.
    ///
    /// The panic happens even when the record itself is filtered out.
    #[track_caller]
    pub fn panic(&self, message: impl Into<String>) -> ! {
        self.raise(CallSite::caller(), message.into())
    }

    #[track_caller]
    pub fn panic_fmt(&self, args: fmt::Arguments<'_>) -> ! {
        self.raise(CallSite::caller(), fmt::format(args))
    }

    pub fn panic_at(&self, site: CallSite, args: fmt::Arguments<'_>) -> ! {
        self.raise(site, fmt::format(args))
    }

    /// Start timing an operation.
    ///
    /// Returns a closure that, when called, logs `message` at the timing
    /// level with the elapsed time appended. If the timing level is below
    /// the logger's threshold the closure does nothing and no clock is read.
    ///
    /// ```
    /// use rust_slot_logger::Logger;
    ///
    /// let logger = Logger::new();
    /// let done = logger.timing("load cache");
    /// // ... work ...
    /// done();
    /// ```
    #[track_caller]
    pub fn timing(&self, message: impl Into<String>) -> impl FnOnce() + Send + 'static {
        self.timing_at(CallSite::caller(), message.into())
    }

    #[track_caller]
    pub fn timing_fmt(&self, args: fmt::Arguments<'_>) -> impl FnOnce() + Send + 'static {
        self.timing_at(CallSite::caller(), fmt::format(args))
    }

    pub fn timing_at(&self, site: CallSite, message: String) -> impl FnOnce() + Send + 'static {
        let armed = {
            let shared = self.shared.lock();
            let timing_level = shared.config.timing_level;
            shared
                .config
                .level
                .admits(timing_level)
                .then(|| (self.clone(), timing_level, message, Instant::now()))
        };

        move || {
            if let Some((logger, level, message, started)) = armed {
                logger.emit(site, level, || {
                    format!("{} (elapsed: {:?})", message, started.elapsed())
                });
            }
        }
    }

    fn emit(&self, site: CallSite, level: Level, message: impl FnOnce() -> String) {
        if level == Level::Off {
            return;
        }

        let (threshold, track_level, exit_level, disabled) = {
            let shared = self.shared.lock();
            let c = &shared.config;
            (c.level, c.track_level, c.exit_level, c.disabled)
        };
        if !threshold.admits(level) {
            return;
        }

        let mut message = message();
        if track_level.admits(level) {
            message.push('\n');
            message.push_str(&Backtrace::force_capture().to_string());
        }

        let record = Self::build_record(site, level, message, disabled);
        self.dispatch(record);

        if exit_level.admits(level) {
            self.exit();
        }
    }

    fn raise(&self, site: CallSite, message: String) -> ! {
        let (threshold, panic_level, disabled) = {
            let shared = self.shared.lock();
            let c = &shared.config;
            (c.level, c.panic_level, c.disabled)
        };

        if panic_level != Level::Off && threshold.admits(panic_level) {
            let record = Self::build_record(site, panic_level, message.clone(), disabled);
            self.dispatch(record);
        }

        panic!("{}", message);
    }

    fn build_record(site: CallSite, level: Level, message: String, disabled: Flags) -> Record {
        let site = if disabled.contains(Flags::RUNTIME) {
            CallSite::default()
        } else {
            site
        };
        Record::new(level, message, site)
    }

    /// Run filters and limiters, attach attributes and fan out, all under
    /// the root lock. Returns whether the record reached the slots.
    fn dispatch(&self, mut record: Record) -> bool {
        let mut guard = self.shared.lock();
        let Shared {
            config,
            slots,
            limits,
        } = &mut *guard;

        if !self.admits(config, limits, &record) {
            self.metrics.record_filtered();
            return false;
        }

        record.aux = self.attrs.build_aux(config.disabled);
        self.metrics.record_emitted();
        slots.dispatch(&record, &self.metrics);
        true
    }

    /// Global filter, then count limiter, then time limiter; stops at the
    /// first rejection so later limiters keep their state untouched.
    fn admits(&self, config: &Config, limits: &mut LimiterState, record: &Record) -> bool {
        if let Some(filter) = &config.filter {
            if !filter.accept(record) {
                return false;
            }
        }

        if let Some(limiter) = &self.attrs.count_limiter {
            if !config.disabled.contains(Flags::LIMIT_BY_COUNT)
                && !limiter.allow(limits, record.locator())
            {
                return false;
            }
        }

        if let Some(limiter) = &self.attrs.time_limiter {
            if !config.disabled.contains(Flags::LIMIT_BY_TIME)
                && !limiter.allow(limits, record.locator(), record.time)
            {
                return false;
            }
        }

        true
    }

    fn exit(&self) -> ! {
        if let Err(e) = self.flush() {
            eprintln!("[LOGGER ERROR] Failed to flush before exit: {}", e);
        }
        std::process::exit(1);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("attributes", &self.attrs)
            .finish_non_exhaustive()
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use rust_slot_logger::prelude::*;
/// use std::sync::Arc;
///
/// let text: Arc<dyn Formatter> = Arc::new(TextFormatter::new());
/// let logger = Logger::builder()
///     .level(Level::Debug)
///     .link(Slot::S0, SlotLink::new(text.clone(), Arc::new(ConsoleWriter::new())))
///     .link(
///         Slot::S1,
///         SlotLink::new(text, Arc::new(NullWriter)).with_level(Level::Error),
///     )
///     .build();
///
/// assert_eq!(logger.slot_level(Slot::S1), Level::Error);
/// ```
pub struct LoggerBuilder {
    config: Config,
    links: Vec<(Slot, SlotLink)>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            links: Vec::new(),
        }
    }

    /// Start from a complete config
    #[must_use = "builder methods return a new value"]
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, level: Level) -> Self {
        self.config.level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn track_level(mut self, level: Level) -> Self {
        self.config.track_level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn exit_level(mut self, level: Level) -> Self {
        self.config.exit_level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn timing_level(mut self, level: Level) -> Self {
        self.config.timing_level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn panic_level(mut self, level: Level) -> Self {
        self.config.panic_level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn filter(mut self, filter: FilterRef) -> Self {
        self.config.filter = Some(filter);
        self
    }

    /// Switch off features for every record
    #[must_use = "builder methods return a new value"]
    pub fn disable(mut self, flags: Flags) -> Self {
        self.config.disabled.insert(flags);
        self
    }

    /// Link a slot; later links to the same slot win
    #[must_use = "builder methods return a new value"]
    pub fn link(mut self, slot: Slot, link: SlotLink) -> Self {
        self.links.push((slot, link));
        self
    }

    /// Build the Logger
    pub fn build(self) -> Logger {
        let logger = Logger::with_config(self.config);
        {
            let mut shared = logger.shared.lock();
            for (slot, link) in self.links {
                shared.slots.link(slot, link);
            }
        }
        logger
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    /// Create a builder for Logger
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }
}
