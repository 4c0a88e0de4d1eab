//! Queueing writer that moves output off the caller's thread
//!
//! [`AsyncWriter`] wraps any [`Writer`]. `write` only enqueues a copy of the
//! bytes and the record onto a bounded channel; a worker thread drains the
//! channel into the inner writer in submission order. This keeps slow
//! destinations from stalling the logger lock.

use crate::core::{LoggerError, Record, Result, Writer};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Default timeout for draining the queue on flush and drop
///
/// Drop waits at most this long for the worker to finish writing queued
/// records. Records still queued afterwards are lost.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Default number of records the queue holds before dropping
pub const DEFAULT_QUEUE_CAPACITY: usize = 8192;

enum Message {
    Write(Vec<u8>, Record),
    Flush(Sender<Result<()>>),
}

/// Counters shared between the writer handle and its worker
#[derive(Debug, Default)]
struct QueueStats {
    dropped: AtomicU64,
    written: AtomicU64,
    failed: AtomicU64,
}

/// Writer that hands records to a background thread.
///
/// When the queue is full new records are dropped and counted; a warning
/// goes to stderr on the first drop and every 1000 after.
///
/// # Example
///
/// ```
/// use rust_slot_logger::prelude::*;
/// use std::sync::Arc;
///
/// let writer = Arc::new(AsyncWriter::new(Arc::new(NullWriter)));
/// let logger = Logger::new();
/// logger.link(Slot::S0, SlotLink::new(Arc::new(TextFormatter::new()), writer.clone()));
///
/// logger.info("queued");
/// logger.flush().unwrap();
/// assert_eq!(writer.written_count(), 1);
/// ```
pub struct AsyncWriter {
    sender: Option<Sender<Message>>,
    worker: Option<JoinHandle<()>>,
    stats: Arc<QueueStats>,
    capacity: usize,
    name: String,
}

impl AsyncWriter {
    pub fn new(inner: Arc<dyn Writer>) -> Self {
        Self::with_capacity(inner, DEFAULT_QUEUE_CAPACITY)
    }

    /// Create an async writer buffering at most `capacity` records
    pub fn with_capacity(inner: Arc<dyn Writer>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, receiver) = bounded(capacity);
        let stats = Arc::new(QueueStats::default());
        let name = format!("async({})", inner.name());

        let worker_stats = Arc::clone(&stats);
        let worker = thread::spawn(move || Self::run(inner, receiver, worker_stats));

        Self {
            sender: Some(sender),
            worker: Some(worker),
            stats,
            capacity,
            name,
        }
    }

    fn run(inner: Arc<dyn Writer>, receiver: Receiver<Message>, stats: Arc<QueueStats>) {
        // Exits once every sender is gone and the queue is drained
        for message in receiver {
            match message {
                Message::Write(bytes, record) => {
                    let result = catch_unwind(AssertUnwindSafe(|| inner.write(&bytes, &record)));
                    match result {
                        Ok(Ok(())) => {
                            stats.written.fetch_add(1, Ordering::Relaxed);
                        }
                        Ok(Err(e)) => {
                            stats.failed.fetch_add(1, Ordering::Relaxed);
                            eprintln!("[LOGGER ERROR] Writer '{}' failed: {}", inner.name(), e);
                        }
                        Err(_) => {
                            stats.failed.fetch_add(1, Ordering::Relaxed);
                            eprintln!("[LOGGER CRITICAL] Writer '{}' panicked", inner.name());
                        }
                    }
                }
                Message::Flush(ack) => {
                    let result = catch_unwind(AssertUnwindSafe(|| inner.flush()))
                        .unwrap_or_else(|_| Err(LoggerError::writer("flush panicked")));
                    let _ = ack.send(result);
                }
            }
        }

        if let Err(e) = inner.flush() {
            eprintln!("[LOGGER ERROR] Failed to flush '{}' during shutdown: {}", inner.name(), e);
        }
    }

    /// Enqueue without blocking, reporting a full queue as an error
    pub fn try_submit(&self, bytes: &[u8], record: &Record) -> Result<()> {
        let sender = self.sender.as_ref().ok_or(LoggerError::LoggerStopped)?;
        match sender.try_send(Message::Write(bytes.to_vec(), record.clone())) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(LoggerError::queue_full(sender.len(), self.capacity)),
            Err(TrySendError::Disconnected(_)) => Err(LoggerError::LoggerStopped),
        }
    }

    /// Records dropped because the queue was full
    pub fn dropped_count(&self) -> u64 {
        self.stats.dropped.load(Ordering::Relaxed)
    }

    /// Records the inner writer accepted
    pub fn written_count(&self) -> u64 {
        self.stats.written.load(Ordering::Relaxed)
    }

    /// Records the inner writer rejected or panicked on
    pub fn failed_count(&self) -> u64 {
        self.stats.failed.load(Ordering::Relaxed)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records currently waiting in the queue
    pub fn queued(&self) -> usize {
        self.sender.as_ref().map_or(0, Sender::len)
    }

    fn alert_and_drop(&self) {
        let dropped_count = self.stats.dropped.fetch_add(1, Ordering::Relaxed);

        // Alert on first drop and periodically thereafter
        if dropped_count == 0 || (dropped_count + 1) % 1000 == 0 {
            eprintln!(
                "[LOGGER WARNING] Queue full, {} records dropped by '{}'. \
                 Consider increasing the queue capacity.",
                dropped_count + 1,
                self.name
            );
        }
    }

    /// Close the queue and wait up to `timeout` for the worker to drain it
    fn shutdown(&mut self, timeout: Duration) -> bool {
        // Close the channel to signal worker thread
        drop(self.sender.take());

        let Some(handle) = self.worker.take() else {
            return true;
        };

        let start = Instant::now();
        loop {
            if handle.is_finished() {
                if let Err(e) = handle.join() {
                    eprintln!("[LOGGER ERROR] Async writer thread panicked during shutdown: {:?}", e);
                    return false;
                }
                return true;
            }

            if start.elapsed() >= timeout {
                eprintln!(
                    "[LOGGER WARNING] Async writer '{}' did not finish within timeout. \
                     Some records may be lost.",
                    self.name
                );
                return false;
            }

            // Small sleep to avoid busy-waiting
            thread::sleep(Duration::from_millis(10));
        }
    }
}

impl Writer for AsyncWriter {
    fn write(&self, bytes: &[u8], record: &Record) -> Result<()> {
        match self.try_submit(bytes, record) {
            Err(LoggerError::QueueFull { .. }) => {
                self.alert_and_drop();
                Ok(())
            }
            other => other,
        }
    }

    /// Wait until everything queued so far has been written, then flush the
    /// inner writer.
    fn flush(&self) -> Result<()> {
        let sender = self.sender.as_ref().ok_or(LoggerError::LoggerStopped)?;
        let (ack, done) = bounded(1);

        sender
            .send_timeout(Message::Flush(ack), DEFAULT_SHUTDOWN_TIMEOUT)
            .map_err(|_| LoggerError::ChannelSendError)?;

        done.recv_timeout(DEFAULT_SHUTDOWN_TIMEOUT)
            .map_err(|_| LoggerError::writer(format!("'{}' flush timed out", self.name)))?
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for AsyncWriter {
    fn drop(&mut self) {
        self.shutdown(DEFAULT_SHUTDOWN_TIMEOUT);
    }
}

impl std::fmt::Debug for AsyncWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncWriter")
            .field("name", &self.name)
            .field("capacity", &self.capacity)
            .field("dropped", &self.dropped_count())
            .finish_non_exhaustive()
    }
}
