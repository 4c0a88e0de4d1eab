//! Logger metrics for observability
//!
//! Counters for monitoring the emission pipeline: how many records were
//! emitted or dropped by filters and limiters, and how often formatters and
//! writers failed.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for logger observability
///
/// Shared by a root logger and every logger derived from it.
///
/// # Example
///
/// ```
/// use rust_slot_logger::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
///
/// metrics.record_emitted();
/// metrics.record_filtered();
///
/// assert_eq!(metrics.emitted(), 1);
/// assert_eq!(metrics.filtered(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Records that passed filters and limiters and reached the slots
    emitted: AtomicU64,

    /// Records dropped by the global filter or a rate limiter
    filtered: AtomicU64,

    /// Successful writer calls
    writes: AtomicU64,

    /// Formatter calls that failed or panicked
    format_errors: AtomicU64,

    /// Writer calls that failed or panicked
    write_errors: AtomicU64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            emitted: AtomicU64::new(0),
            filtered: AtomicU64::new(0),
            writes: AtomicU64::new(0),
            format_errors: AtomicU64::new(0),
            write_errors: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn emitted(&self) -> u64 {
        self.emitted.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn filtered(&self) -> u64 {
        self.filtered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn format_errors(&self) -> u64 {
        self.format_errors.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn write_errors(&self) -> u64 {
        self.write_errors.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_emitted(&self) -> u64 {
        self.emitted.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_filtered(&self) -> u64 {
        self.filtered.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_write(&self) -> u64 {
        self.writes.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_format_error(&self) -> u64 {
        self.format_errors.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_write_error(&self) -> u64 {
        self.write_errors.fetch_add(1, Ordering::Relaxed)
    }

    /// Get filter rate as a percentage (0.0 - 100.0)
    ///
    /// Returns 0.0 if no records have been processed.
    pub fn filter_rate(&self) -> f64 {
        let filtered = self.filtered() as f64;
        let total = filtered + self.emitted() as f64;

        if total == 0.0 {
            0.0
        } else {
            (filtered / total) * 100.0
        }
    }

    /// Reset all counters to zero
    pub fn reset(&self) {
        self.emitted.store(0, Ordering::Relaxed);
        self.filtered.store(0, Ordering::Relaxed);
        self.writes.store(0, Ordering::Relaxed);
        self.format_errors.store(0, Ordering::Relaxed);
        self.write_errors.store(0, Ordering::Relaxed);
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}
