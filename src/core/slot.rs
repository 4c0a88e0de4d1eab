//! Eight fixed output slots
//!
//! Each slot binds a formatter, a writer, a level threshold and an optional
//! filter. Slots are addressed by [`Slot`], so an out-of-range slot cannot
//! be named. An unlinked slot is in the null state: nothing bound, level
//! [`Level::Off`].
//!
//! The table keeps an equivalents index: for every slot, the first slot
//! bound to the very same formatter instance. During one emission each
//! distinct formatter runs at most once and its bytes are reused by every
//! slot sharing it.

use super::filter::FilterRef;
use super::formatter::Formatter;
use super::log_level::Level;
use super::metrics::LoggerMetrics;
use super::record::Record;
use super::writer::Writer;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Identifier of one of the eight slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    S0 = 0,
    S1 = 1,
    S2 = 2,
    S3 = 3,
    S4 = 4,
    S5 = 5,
    S6 = 6,
    S7 = 7,
}

impl Slot {
    pub const COUNT: usize = 8;

    pub const ALL: [Slot; Slot::COUNT] = [
        Slot::S0,
        Slot::S1,
        Slot::S2,
        Slot::S3,
        Slot::S4,
        Slot::S5,
        Slot::S6,
        Slot::S7,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Slot> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot #{}", self.index())
    }
}

/// What a slot is bound to.
///
/// # Example
///
/// ```
/// use rust_slot_logger::{Level, NullWriter, SlotLink, TextFormatter};
/// use std::sync::Arc;
///
/// let link = SlotLink::new(Arc::new(TextFormatter::new()), Arc::new(NullWriter))
///     .with_level(Level::Warn);
/// assert_eq!(link.level(), Level::Warn);
/// ```
#[derive(Clone)]
pub struct SlotLink {
    formatter: Arc<dyn Formatter>,
    writer: Arc<dyn Writer>,
    level: Level,
    filter: Option<FilterRef>,
}

impl SlotLink {
    /// Bind `formatter` and `writer`, admitting every level.
    pub fn new(formatter: Arc<dyn Formatter>, writer: Arc<dyn Writer>) -> Self {
        Self {
            formatter,
            writer,
            level: Level::Trace,
            filter: None,
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_filter(mut self, filter: FilterRef) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn formatter(&self) -> &Arc<dyn Formatter> {
        &self.formatter
    }

    pub fn writer(&self) -> &Arc<dyn Writer> {
        &self.writer
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn filter(&self) -> Option<&FilterRef> {
        self.filter.as_ref()
    }

    fn admits(&self, record: &Record) -> bool {
        self.level.admits(record.level)
            && self.filter.as_ref().is_none_or(|f| f.accept(record))
    }
}

impl fmt::Debug for SlotLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotLink")
            .field("formatter", &self.formatter.name())
            .field("writer", &self.writer.name())
            .field("level", &self.level)
            .field("filter", &self.filter.is_some())
            .finish()
    }
}

/// Whether two handles point at the same formatter instance.
pub fn same_formatter(a: &Arc<dyn Formatter>, b: &Arc<dyn Formatter>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

/// The eight slots of a logger and their equivalents index.
#[derive(Clone)]
pub struct SlotTable {
    links: [Option<SlotLink>; Slot::COUNT],
    leaders: [usize; Slot::COUNT],
}

impl SlotTable {
    pub fn new() -> Self {
        Self {
            links: Default::default(),
            leaders: std::array::from_fn(|i| i),
        }
    }

    pub fn get(&self, slot: Slot) -> Option<&SlotLink> {
        self.links[slot.index()].as_ref()
    }

    pub fn has_link(&self, slot: Slot) -> bool {
        self.links[slot.index()].is_some()
    }

    /// Threshold of `slot`; `Off` for an unlinked slot.
    pub fn level(&self, slot: Slot) -> Level {
        self.get(slot).map_or(Level::Off, SlotLink::level)
    }

    /// First slot sharing `slot`'s formatter instance (possibly `slot`).
    pub fn leader(&self, slot: Slot) -> Slot {
        Slot::ALL[self.leaders[slot.index()]]
    }

    pub fn link(&mut self, slot: Slot, link: SlotLink) {
        self.links[slot.index()] = Some(link);
        self.reindex();
    }

    pub fn unlink(&mut self, slot: Slot) {
        self.links[slot.index()] = None;
        self.reindex();
    }

    pub fn unlink_all(&mut self) {
        self.links = Default::default();
        self.reindex();
    }

    /// Change the threshold of a linked slot. Returns false if unlinked.
    pub fn set_level(&mut self, slot: Slot, level: Level) -> bool {
        match self.links[slot.index()].as_mut() {
            Some(link) => {
                link.level = level;
                true
            }
            None => false,
        }
    }

    pub fn copy(&mut self, dst: Slot, src: Slot) {
        self.links[dst.index()] = self.links[src.index()].clone();
        self.reindex();
    }

    /// Copy `from` into `to`, then reset `from` to the null state.
    pub fn move_slot(&mut self, to: Slot, from: Slot) {
        if to == from {
            return;
        }
        self.links[to.index()] = self.links[from.index()].take();
        self.reindex();
    }

    pub fn swap(&mut self, a: Slot, b: Slot) {
        self.links.swap(a.index(), b.index());
        self.reindex();
    }

    pub fn iter(&self) -> impl Iterator<Item = (Slot, &SlotLink)> + '_ {
        Slot::ALL
            .into_iter()
            .filter_map(move |slot| self.get(slot).map(|link| (slot, link)))
    }

    fn reindex(&mut self) {
        let links = &self.links;
        self.leaders = std::array::from_fn(|i| match &links[i] {
            Some(link) => (0..i)
                .find(|&j| {
                    links[j]
                        .as_ref()
                        .is_some_and(|other| same_formatter(&other.formatter, &link.formatter))
                })
                .unwrap_or(i),
            None => i,
        });
    }

    /// Fan `record` out to every slot whose level and filter admit it.
    ///
    /// Slots run in index order. A failing or panicking formatter skips the
    /// slots that share it; a failing or panicking writer skips only its own
    /// slot. Returns the number of successful writes.
    pub fn dispatch(&self, record: &Record, metrics: &LoggerMetrics) -> usize {
        // Per leader: None = not yet formatted, Some(None) = formatting failed
        let mut rendered: [Option<Option<Vec<u8>>>; Slot::COUNT] = Default::default();
        let mut delivered = 0;

        for slot in Slot::ALL {
            let Some(link) = self.get(slot) else {
                continue;
            };
            if !link.admits(record) {
                continue;
            }

            let leader = self.leaders[slot.index()];
            let bytes = rendered[leader]
                .get_or_insert_with(|| Self::render(slot, link, record, metrics));
            let Some(bytes) = bytes.as_deref() else {
                continue;
            };

            let result = catch_unwind(AssertUnwindSafe(|| link.writer.write(bytes, record)));
            match result {
                Ok(Ok(())) => {
                    delivered += 1;
                    metrics.record_write();
                }
                Ok(Err(e)) => {
                    eprintln!(
                        "[LOGGER ERROR] Writer '{}' on {} failed: {}",
                        link.writer.name(),
                        slot,
                        e
                    );
                    metrics.record_write_error();
                }
                Err(panic_info) => {
                    eprintln!(
                        "[LOGGER CRITICAL] Writer '{}' on {} panicked: {}. \
                         Other slots continue to function.",
                        link.writer.name(),
                        slot,
                        panic_message(&*panic_info)
                    );
                    metrics.record_write_error();
                }
            }
        }

        delivered
    }

    fn render(
        slot: Slot,
        link: &SlotLink,
        record: &Record,
        metrics: &LoggerMetrics,
    ) -> Option<Vec<u8>> {
        let result = catch_unwind(AssertUnwindSafe(|| link.formatter.format(record)));
        match result {
            Ok(Ok(bytes)) => Some(bytes),
            Ok(Err(e)) => {
                eprintln!(
                    "[LOGGER ERROR] Formatter '{}' on {} failed: {}",
                    link.formatter.name(),
                    slot,
                    e
                );
                metrics.record_format_error();
                None
            }
            Err(panic_info) => {
                eprintln!(
                    "[LOGGER CRITICAL] Formatter '{}' on {} panicked: {}",
                    link.formatter.name(),
                    slot,
                    panic_message(&*panic_info)
                );
                metrics.record_format_error();
                None
            }
        }
    }

    /// Flush every linked writer once, returning the first error.
    pub fn flush(&self) -> super::error::Result<()> {
        let mut first_error = None;
        let mut flushed: Vec<&Arc<dyn Writer>> = Vec::new();

        for (_, link) in self.iter() {
            let already = flushed.iter().any(|w| {
                std::ptr::eq(Arc::as_ptr(*w) as *const (), Arc::as_ptr(&link.writer) as *const ())
            });
            if already {
                continue;
            }
            flushed.push(&link.writer);

            if let Err(e) = link.writer.flush() {
                first_error.get_or_insert(e);
            }
        }

        first_error.map_or(Ok(()), Err)
    }
}

impl Default for SlotTable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SlotTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.links.iter().enumerate().filter_map(|(i, l)| l.as_ref().map(|l| (i, l))))
            .finish()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
