//! Per-call-site rate limiting
//!
//! Two limiters decide whether a record from a given call site may proceed:
//!
//! - [`CountLimiter`]: keeps `limit` out of every `batch` calls.
//! - [`TimeLimiter`]: keeps at most `limit` calls within a sliding window.
//!
//! Limiters carry only their parameters. The per-call-site state lives in a
//! [`LimiterState`] owned by the root logger and shared by every logger
//! derived from it, so two derived loggers logging from the same line of
//! code draw from the same budget.
//!
//! # Example
//!
//! ```
//! use rust_slot_logger::core::limiter::{CountLimiter, LimiterState, Locator};
//!
//! let limiter = CountLimiter::new(3, 2).unwrap();
//! let mut state = LimiterState::default();
//! let site = Locator::new("src/main.rs", 10);
//!
//! let admitted: Vec<bool> = (0..6).map(|_| limiter.allow(&mut state, site)).collect();
//! assert_eq!(admitted, [true, true, false, true, true, false]);
//! ```

use super::error::{LoggerError, Result};
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::time::Duration;

/// Key identifying a call site: source file plus line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Locator {
    pub file: &'static str,
    pub line: u32,
}

impl Locator {
    pub const fn new(file: &'static str, line: u32) -> Self {
        Self { file, line }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Limiter state keyed by call site.
#[derive(Debug, Default)]
pub struct LimiterState {
    counts: HashMap<Locator, i64>,
    windows: HashMap<Locator, TimeQueue>,
}

impl LimiterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls seen so far from `locator` by any count limiter
    pub fn count(&self, locator: Locator) -> i64 {
        self.counts.get(&locator).copied().unwrap_or(0)
    }

    /// Sliding window for `locator`, if a time limiter has seen it
    pub fn window(&self, locator: Locator) -> Option<&TimeQueue> {
        self.windows.get(&locator)
    }

    /// Number of call sites currently tracked
    pub fn tracked_sites(&self) -> usize {
        let mut sites: Vec<&Locator> = self.counts.keys().chain(self.windows.keys()).collect();
        sites.sort();
        sites.dedup();
        sites.len()
    }

    /// Forget all per-call-site history
    pub fn clear(&mut self) {
        self.counts.clear();
        self.windows.clear();
    }
}

/// Keeps `limit` out of every `batch` calls from the same call site.
///
/// A call is admitted iff `counter % batch < limit`, where `counter` is the
/// number of earlier calls from that site. A `limit` of zero drops
/// everything; a `limit` at or above `batch` drops nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountLimiter {
    batch: i64,
    limit: i64,
}

impl CountLimiter {
    pub fn new(batch: i64, limit: i64) -> Result<Self> {
        if batch <= 0 {
            return Err(LoggerError::config(
                "CountLimiter",
                format!("batch must be positive, got {}", batch),
            ));
        }
        if limit < 0 {
            return Err(LoggerError::config(
                "CountLimiter",
                format!("limit must not be negative, got {}", limit),
            ));
        }
        Ok(Self { batch, limit })
    }

    pub fn batch(&self) -> i64 {
        self.batch
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    /// Decide for one call from `locator`, advancing its counter.
    pub fn allow(&self, state: &mut LimiterState, locator: Locator) -> bool {
        let counter = state.counts.entry(locator).or_insert(0);
        let admitted = *counter % self.batch < self.limit;
        *counter += 1;
        admitted
    }
}

/// Keeps at most `limit` calls from one call site inside a window of
/// `duration`.
///
/// The window for each call site is a [`TimeQueue`] created on first use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeLimiter {
    window: TimeDelta,
    limit: usize,
}

impl TimeLimiter {
    pub fn new(duration: Duration, limit: i64) -> Result<Self> {
        if duration.is_zero() {
            return Err(LoggerError::config(
                "TimeLimiter",
                "duration must be positive",
            ));
        }
        let window = TimeDelta::from_std(duration).map_err(|e| {
            LoggerError::config("TimeLimiter", format!("duration out of range: {}", e))
        })?;
        let limit = usize::try_from(limit).map_err(|_| {
            LoggerError::config(
                "TimeLimiter",
                format!("limit must not be negative, got {}", limit),
            )
        })?;
        Ok(Self { window, limit })
    }

    pub fn window(&self) -> TimeDelta {
        self.window
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Decide for one call from `locator` arriving at `now`.
    pub fn allow(&self, state: &mut LimiterState, locator: Locator, now: DateTime<Utc>) -> bool {
        state
            .windows
            .entry(locator)
            .or_insert_with(|| TimeQueue::new(self.window, self.limit))
            .enqueue(now)
    }
}

/// Bounded queue of arrival timestamps for one call site.
///
/// Holds at most `limit` entries and grows on demand. Each
/// [`enqueue`](Self::enqueue) expires at most one entry, the oldest, so after
/// a long quiet period stale timestamps are shed one per call rather than
/// all at once. Admission decisions match a fully swept window because only
/// one entry is added per call; the queue contents do not.
#[derive(Debug, Clone)]
pub struct TimeQueue {
    window: TimeDelta,
    limit: usize,
    stamps: VecDeque<DateTime<Utc>>,
}

impl TimeQueue {
    pub fn new(window: TimeDelta, limit: usize) -> Self {
        Self {
            window,
            limit,
            stamps: VecDeque::new(),
        }
    }

    /// Record an arrival at `now`; returns whether it was admitted.
    pub fn enqueue(&mut self, now: DateTime<Utc>) -> bool {
        if let Some(&oldest) = self.stamps.front() {
            if now - oldest >= self.window {
                self.stamps.pop_front();
            }
        }

        if self.stamps.len() >= self.limit {
            return false;
        }

        self.stamps.push_back(now);
        true
    }

    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }

    pub fn oldest(&self) -> Option<DateTime<Utc>> {
        self.stamps.front().copied()
    }

    pub fn newest(&self) -> Option<DateTime<Utc>> {
        self.stamps.back().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    const SITE: Locator = Locator::new("src/lib.rs", 7);
    const OTHER: Locator = Locator::new("src/lib.rs", 8);

    #[test]
    fn test_count_limiter_pattern() {
        let limiter = CountLimiter::new(3, 2).unwrap();
        let mut state = LimiterState::new();

        let admitted: Vec<bool> = (0..6).map(|_| limiter.allow(&mut state, SITE)).collect();
        assert_eq!(admitted, [true, true, false, true, true, false]);
        assert_eq!(state.count(SITE), 6);
    }

    #[test]
    fn test_count_limiter_limit_above_batch_never_drops() {
        let limiter = CountLimiter::new(2, 5).unwrap();
        let mut state = LimiterState::new();

        assert!((0..20).all(|_| limiter.allow(&mut state, SITE)));
    }

    #[test]
    fn test_count_limiter_zero_limit_drops_all() {
        let limiter = CountLimiter::new(4, 0).unwrap();
        let mut state = LimiterState::new();

        assert!((0..8).all(|_| !limiter.allow(&mut state, SITE)));
    }

    #[test]
    fn test_count_limiter_sites_are_independent() {
        let limiter = CountLimiter::new(2, 1).unwrap();
        let mut state = LimiterState::new();

        assert!(limiter.allow(&mut state, SITE));
        assert!(limiter.allow(&mut state, OTHER));
        assert!(!limiter.allow(&mut state, SITE));
        assert!(!limiter.allow(&mut state, OTHER));
        assert_eq!(state.tracked_sites(), 2);
    }

    #[test]
    fn test_count_limiter_rejects_bad_parameters() {
        assert!(CountLimiter::new(0, 1).is_err());
        assert!(CountLimiter::new(-3, 1).is_err());
        assert!(CountLimiter::new(3, -1).is_err());
        assert!(CountLimiter::new(1, 0).is_ok());
    }

    #[test]
    fn test_time_limiter_rejects_bad_parameters() {
        assert!(TimeLimiter::new(Duration::ZERO, 1).is_err());
        assert!(TimeLimiter::new(Duration::from_secs(1), -1).is_err());
        assert!(TimeLimiter::new(Duration::from_secs(1), 0).is_ok());
    }

    #[test]
    fn test_time_queue_admits_up_to_limit() {
        let mut queue = TimeQueue::new(TimeDelta::seconds(10), 2);

        assert!(queue.enqueue(at(0)));
        assert!(queue.enqueue(at(1)));
        assert!(!queue.enqueue(at(2)));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_time_queue_expiry_at_exact_window() {
        let mut queue = TimeQueue::new(TimeDelta::seconds(10), 1);

        assert!(queue.enqueue(at(0)));
        assert!(!queue.enqueue(at(9)));
        assert!(queue.enqueue(at(10)));
        assert_eq!(queue.oldest(), Some(at(10)));
    }

    #[test]
    fn test_time_queue_evicts_one_entry_per_call() {
        let mut queue = TimeQueue::new(TimeDelta::seconds(10), 3);
        assert!(queue.enqueue(at(0)));
        assert!(queue.enqueue(at(1)));
        assert!(queue.enqueue(at(2)));

        // All three are stale, but only the oldest is shed.
        assert!(queue.enqueue(at(100)));
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.oldest(), Some(at(1)));

        assert!(queue.enqueue(at(101)));
        assert_eq!(queue.oldest(), Some(at(2)));

        assert!(queue.enqueue(at(102)));
        assert_eq!(queue.oldest(), Some(at(100)));

        // Now everything held is fresh and the queue is full.
        assert!(!queue.enqueue(at(103)));
        assert_eq!(queue.newest(), Some(at(102)));
    }

    #[test]
    fn test_time_queue_zero_limit_rejects() {
        let mut queue = TimeQueue::new(TimeDelta::seconds(1), 0);
        assert!(!queue.enqueue(at(0)));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_time_limiter_max_limit_allocates_on_demand() {
        let limiter = TimeLimiter::new(Duration::from_secs(1), i64::MAX).unwrap();
        let mut state = LimiterState::new();

        for i in 0..5 {
            assert!(limiter.allow(&mut state, SITE, at(i)));
        }
        assert_eq!(state.window(SITE).map(TimeQueue::len), Some(1));
    }

    #[test]
    fn test_time_limiter_creates_window_lazily() {
        let limiter = TimeLimiter::new(Duration::from_secs(5), 1).unwrap();
        let mut state = LimiterState::new();
        assert!(state.window(SITE).is_none());

        assert!(limiter.allow(&mut state, SITE, at(0)));
        assert!(!limiter.allow(&mut state, SITE, at(1)));
        assert!(limiter.allow(&mut state, OTHER, at(1)));
        assert_eq!(state.window(SITE).map(TimeQueue::len), Some(1));

        state.clear();
        assert_eq!(state.tracked_sites(), 0);
    }
}
