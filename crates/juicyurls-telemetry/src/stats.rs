//! Run statistics aggregation
//!
//! Workers never touch the shared counters once per URL. Each task keeps a
//! private [`StatsDelta`] and folds it into the [`StatsAggregator`] on a
//! bounded cadence and once more on exit, so the shared lock is taken once
//! per flush rather than once per URL.
//!
//! `total` is the exception: the single producer bumps it with one atomic
//! add per line *before* dispatching the line, so a snapshot can never see a
//! processed URL whose line is not yet counted.

use crate::metrics as names;
use juicyurls_core::RunStats;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Counters accumulated privately by one task between flushes
#[derive(Debug, Clone)]
pub struct StatsDelta {
    pub suspicious: u64,
    pub invalid: u64,
    pub processed: u64,
    pub skipped: u64,
    last_flush: Instant,
}

impl StatsDelta {
    pub fn new() -> Self {
        Self {
            suspicious: 0,
            invalid: 0,
            processed: 0,
            skipped: 0,
            last_flush: Instant::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.suspicious == 0 && self.invalid == 0 && self.processed == 0 && self.skipped == 0
    }

    /// Whether `interval` has passed since the last flush
    pub fn is_due(&self, interval: Duration) -> bool {
        self.last_flush.elapsed() >= interval
    }

    fn reset(&mut self) {
        self.suspicious = 0;
        self.invalid = 0;
        self.processed = 0;
        self.skipped = 0;
        self.last_flush = Instant::now();
    }
}

impl Default for StatsDelta {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default)]
struct Counters {
    processed: u64,
    suspicious: u64,
    invalid: u64,
    skipped: u64,
}

/// Thread-safe run statistics shared by the producer, every worker and the
/// progress reporter
#[derive(Debug, Default)]
pub struct StatsAggregator {
    seen: AtomicU64,
    counters: RwLock<Counters>,
    flushes: AtomicU64,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count input lines before filtering. Called by the producer ahead of
    /// dispatch.
    pub fn record_seen(&self, lines: u64) {
        self.seen.fetch_add(lines, Ordering::Release);
        metrics::counter!(names::URLS_TOTAL).increment(lines);
    }

    /// Fold one batch of counts into the shared totals
    pub fn record_batch(&self, suspicious: u64, invalid: u64, processed: u64, skipped: u64) {
        {
            let mut counters = self.counters.write();
            counters.suspicious += suspicious;
            counters.invalid += invalid;
            counters.processed += processed;
            counters.skipped += skipped;
        }

        self.flushes.fetch_add(1, Ordering::Relaxed);
        names::record_flush(suspicious, invalid, processed, skipped);
    }

    /// Flush a task-local delta and reset it. Empty deltas are dropped.
    pub fn flush(&self, delta: &mut StatsDelta) {
        if !delta.is_empty() {
            self.record_batch(delta.suspicious, delta.invalid, delta.processed, delta.skipped);
        }
        delta.reset();
    }

    /// Flush only if `interval` has elapsed since the delta's last flush
    pub fn flush_if_due(&self, delta: &mut StatsDelta, interval: Duration) {
        if delta.is_due(interval) {
            self.flush(delta);
        }
    }

    /// Consistent view of the totals. Holds the read lock only while copying.
    pub fn snapshot(&self) -> RunStats {
        let (processed, suspicious, invalid, skipped) = {
            let counters = self.counters.read();
            (
                counters.processed,
                counters.suspicious,
                counters.invalid,
                counters.skipped,
            )
        };

        // Loaded after the worker counters: every line a worker has flushed
        // was counted here before it was sent.
        let total = self.seen.load(Ordering::Acquire);

        RunStats {
            total,
            processed,
            suspicious,
            invalid,
            skipped,
        }
    }

    /// Number of non-empty flushes applied so far
    pub fn flush_count(&self) -> u64 {
        self.flushes.load(Ordering::Relaxed)
    }
}
