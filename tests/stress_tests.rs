//! Stress tests for concurrent use of one logger family
//!
//! These tests verify:
//! - Writes from many threads are never interleaved or lost
//! - Rate-limiter state stays exact under contention
//! - Config changes and slot rewiring are safe while logging
//! - The async writer keeps per-thread order under load

use parking_lot::Mutex;
use rust_slot_logger::prelude::*;
use rust_slot_logger::{context_args, Record};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const THREADS: usize = 8;
const PER_THREAD: usize = 500;

/// Writer that detects overlapping calls
#[derive(Default)]
struct OrderedWriter {
    active: AtomicUsize,
    overlaps: AtomicUsize,
    lines: Mutex<Vec<String>>,
}

impl Writer for OrderedWriter {
    fn write(&self, bytes: &[u8], _record: &Record) -> rust_slot_logger::Result<()> {
        if self.active.fetch_add(1, Ordering::SeqCst) != 0 {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        self.lines
            .lock()
            .push(String::from_utf8_lossy(bytes).into_owned());
        self.active.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> &str {
        "ordered"
    }
}

struct MessageFormatter;

impl Formatter for MessageFormatter {
    fn format(&self, record: &Record) -> rust_slot_logger::Result<Vec<u8>> {
        Ok(record.message.clone().into_bytes())
    }

    fn name(&self) -> &str {
        "message"
    }
}

/// Parse "t{thread}-{seq}" lines into per-thread sequences
fn sequences(lines: &[String]) -> HashMap<usize, Vec<usize>> {
    let mut seqs: HashMap<usize, Vec<usize>> = HashMap::new();
    for line in lines {
        let (t, n) = line
            .trim_start_matches('t')
            .split_once('-')
            .expect("malformed line");
        seqs.entry(t.parse().unwrap())
            .or_default()
            .push(n.parse().unwrap());
    }
    seqs
}

#[test]
fn test_concurrent_writes_are_totally_ordered() {
    let first = Arc::new(OrderedWriter::default());
    let second = Arc::new(OrderedWriter::default());
    let formatter: Arc<dyn Formatter> = Arc::new(MessageFormatter);

    let logger = Logger::builder()
        .link(Slot::S0, SlotLink::new(formatter.clone(), first.clone()))
        .link(Slot::S1, SlotLink::new(formatter, second.clone()))
        .build();

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let logger = logger.with_context(context_args!["thread", t]);
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    logger.info(format!("t{}-{}", t, i));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    assert_eq!(first.overlaps.load(Ordering::SeqCst), 0);
    assert_eq!(second.overlaps.load(Ordering::SeqCst), 0);

    // Both slots saw the same global order
    let lines = first.lines.lock().clone();
    assert_eq!(lines.len(), THREADS * PER_THREAD);
    assert_eq!(lines, *second.lines.lock());

    for (_, seq) in sequences(&lines) {
        assert_eq!(seq, (0..PER_THREAD).collect::<Vec<_>>());
    }
}

#[test]
fn test_count_limit_exact_under_contention() {
    let writer = Arc::new(OrderedWriter::default());
    let logger = Logger::new();
    logger.link(Slot::S0, SlotLink::new(Arc::new(MessageFormatter), writer.clone()));
    let limited = logger.with_count_limit(10, 3).unwrap();

    fn shared_site(logger: &Logger, t: usize, i: usize) {
        logger.info(format!("t{}-{}", t, i));
    }

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let limited = limited.clone();
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    shared_site(&limited, t, i);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    let total = THREADS * PER_THREAD;
    assert_eq!(writer.lines.lock().len(), total / 10 * 3);
    assert_eq!(logger.metrics().filtered() as usize, total - total / 10 * 3);
}

#[test]
fn test_reconfiguration_while_logging() {
    let writer = Arc::new(OrderedWriter::default());
    let logger = Logger::new();
    logger.link(Slot::S0, SlotLink::new(Arc::new(MessageFormatter), writer.clone()));

    let loggers: Vec<_> = (0..4)
        .map(|t| {
            let logger = logger.with_prefix(format!("worker-{}", t));
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    logger.warn(format!("t{}-{}", t, i));
                }
            })
        })
        .collect();

    let admin = logger.clone();
    let rewire = thread::spawn(move || {
        for i in 0..200 {
            let slot = Slot::from_index(1 + i % 7).unwrap();
            admin.copy_slot(slot, Slot::S0);
            admin.set_level(if i % 2 == 0 { Level::Info } else { Level::Trace });
            admin.unlink(slot);
            thread::sleep(Duration::from_micros(50));
        }
    });

    for handle in loggers {
        handle.join().expect("Thread panicked");
    }
    rewire.join().expect("Rewiring thread panicked");

    assert_eq!(writer.overlaps.load(Ordering::SeqCst), 0);
    assert!(writer.lines.lock().len() >= 4 * PER_THREAD);
}

#[test]
fn test_async_writer_under_load() {
    let inner = Arc::new(OrderedWriter::default());
    let writer = Arc::new(AsyncWriter::with_capacity(inner.clone(), 16 * 1024));
    let logger = Logger::new();
    logger.link(Slot::S0, SlotLink::new(Arc::new(MessageFormatter), writer.clone()));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let logger = logger.clone();
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    logger.info(format!("t{}-{}", t, i));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }
    logger.flush().expect("Failed to flush");

    assert_eq!(writer.dropped_count(), 0);
    let lines = inner.lines.lock().clone();
    assert_eq!(lines.len(), THREADS * PER_THREAD);
    for (_, seq) in sequences(&lines) {
        assert_eq!(seq, (0..PER_THREAD).collect::<Vec<_>>());
    }
}
