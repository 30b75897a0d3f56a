//! Concurrent classification pipeline
//!
//! One cycle runs a fan-out/fan-in topology over a batch of lines:
//!
//! - a producer that counts every line, skips blanks and comments, and feeds
//!   the rest into a bounded input queue
//! - N workers pulling from the shared queue, classifying, and pushing
//!   suspicious results into a bounded results queue
//! - a sentinel that waits for every worker and then drops the last results
//!   sender, closing the queue
//! - the caller's [`ResultCollector`], driven inline until the queue closes
//!
//! Every blocking point is raced against the cycle's cancellation token, so
//! a timeout or abort unwinds all stages at their next await.

use crate::classifier::Classifier;
use crate::collector::ResultCollector;
use crate::config::{ScanConfig, MAX_WORKERS};
use crate::input::is_skippable;
use futures::future::join_all;
use juicyurls_core::{ClassificationResult, Error, Result, Verdict};
use juicyurls_telemetry::{StatsAggregator, StatsDelta};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinError;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Below this many lines the worker count is scaled down to the input
const SMALL_INPUT_LINES: usize = 1000;

/// Lifecycle of the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineState {
    Idle,
    Running,
    Draining,
    Done,
    Cancelled,
}

impl PipelineState {
    pub fn can_transition_to(self, next: PipelineState) -> bool {
        use PipelineState::*;
        matches!(
            (self, next),
            (Idle, Running)
                | (Running, Draining)
                | (Draining, Done)
                | (Done, Running)
                | (Running, Cancelled)
                | (Draining, Cancelled)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Cancelled)
    }
}

/// Worker count for a batch of `lines`
///
/// `0` derives the count from available parallelism. The result is capped
/// at [`MAX_WORKERS`], scaled to roughly one worker per ten lines for small
/// inputs, and never below one.
pub fn effective_workers(configured: usize, lines: usize) -> usize {
    let mut workers = if configured == 0 {
        num_cpus::get()
    } else {
        configured
    };
    workers = workers.min(MAX_WORKERS);

    if lines < SMALL_INPUT_LINES {
        workers = workers.min(lines / 10 + 1);
    }

    workers.max(1)
}

/// Queue sizing and flush cadence for the dispatcher
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub workers: usize,
    pub queue_factor: usize,
    pub results_factor: usize,
    pub flush_interval: Duration,
}

impl From<&ScanConfig> for DispatchSettings {
    fn from(config: &ScanConfig) -> Self {
        Self {
            workers: config.workers,
            queue_factor: config.queue_factor.max(1),
            results_factor: config.results_factor.max(1),
            flush_interval: config.flush_interval(),
        }
    }
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self::from(&ScanConfig::default())
    }
}

/// Result of one pipeline cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleOutcome {
    /// Workers spawned
    pub workers: usize,
    /// Lines handed to workers
    pub dispatched: u64,
    /// Results pushed onto the results queue, before dedup
    pub emitted: u64,
    /// Whether the cycle ran to completion rather than being cancelled
    pub completed: bool,
}

/// Owns the producer, worker pool and sentinel for each cycle
pub struct Dispatcher {
    classifier: Arc<dyn Classifier>,
    settings: DispatchSettings,
    state: Arc<watch::Sender<PipelineState>>,
}

impl Dispatcher {
    pub fn new(classifier: Arc<dyn Classifier>, settings: DispatchSettings) -> Self {
        let (state, _) = watch::channel(PipelineState::Idle);
        Self {
            classifier,
            settings,
            state: Arc::new(state),
        }
    }

    /// Watch state transitions
    pub fn subscribe(&self) -> watch::Receiver<PipelineState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> PipelineState {
        *self.state.borrow()
    }

    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    /// Return to `Idle` before a new run
    pub fn reset(&self) {
        self.state.send_replace(PipelineState::Idle);
    }

    /// Run one full `Running -> Draining -> Done` cycle over `lines`
    ///
    /// Accepted results go through `collector`. When `cancel` fires, in-flight
    /// items finish, queued results are still collected, and the outcome is
    /// returned with `completed == false`. Only a sink failure or a panicked
    /// task is an error.
    pub async fn run_cycle(
        &self,
        lines: Vec<String>,
        stats: &Arc<StatsAggregator>,
        collector: &mut ResultCollector<'_>,
        cancel: &CancellationToken,
    ) -> Result<CycleOutcome> {
        let workers = effective_workers(self.settings.workers, lines.len());
        let cycle = cancel.child_token();

        transition(&self.state, PipelineState::Running);
        debug!(workers, lines = lines.len(), "Starting pipeline cycle");

        let (input_tx, input_rx) = mpsc::channel::<String>(workers * self.settings.queue_factor);
        let (results_tx, mut results_rx) =
            mpsc::channel::<ClassificationResult>(workers * self.settings.results_factor);

        let producer = tokio::spawn(produce(
            lines,
            input_tx,
            Arc::clone(stats),
            cycle.clone(),
            self.settings.flush_interval,
        ));

        let input_rx = Arc::new(Mutex::new(input_rx));
        let handles: Vec<_> = (0..workers)
            .map(|id| {
                tokio::spawn(work(
                    id,
                    Arc::clone(&self.classifier),
                    Arc::clone(&input_rx),
                    results_tx.clone(),
                    Arc::clone(stats),
                    cycle.clone(),
                    self.settings.flush_interval,
                ))
            })
            .collect();

        let state = Arc::clone(&self.state);
        let sentinel = tokio::spawn(async move {
            let reports = join_all(handles).await;
            transition(&state, PipelineState::Draining);
            drop(results_tx);
            reports
        });

        let drained = match collector.drain(&mut results_rx, &cycle).await {
            Ok(drained) => drained,
            Err(e) => {
                cycle.cancel();
                let _ = sentinel.await;
                let _ = producer.await;
                transition(&self.state, PipelineState::Cancelled);
                return Err(e);
            }
        };

        let joined = match (sentinel.await, producer.await) {
            (Ok(reports), Ok(dispatched)) => reports
                .into_iter()
                .map(|r| r.map_err(task_failed))
                .sum::<Result<u64>>()
                .map(|emitted| (dispatched, emitted)),
            (Err(e), _) | (_, Err(e)) => Err(task_failed(e)),
        };
        let (dispatched, emitted) = match joined {
            Ok(counts) => counts,
            Err(e) => {
                transition(&self.state, PipelineState::Cancelled);
                return Err(e);
            }
        };

        // Results pushed between the collector stopping and the workers
        // exiting
        let late = collector.drain_ready(&mut results_rx).await?;
        if late > 0 {
            debug!(late, "Collected results after cancellation");
        }

        let completed = drained;
        transition(
            &self.state,
            if completed {
                PipelineState::Done
            } else {
                PipelineState::Cancelled
            },
        );

        Ok(CycleOutcome {
            workers,
            dispatched,
            emitted,
            completed,
        })
    }
}

fn transition(state: &watch::Sender<PipelineState>, next: PipelineState) {
    state.send_if_modified(|current| {
        if current.can_transition_to(next) {
            *current = next;
            true
        } else {
            warn!(from = ?current, to = ?next, "Ignoring invalid pipeline transition");
            false
        }
    });
}

fn task_failed(e: JoinError) -> Error {
    Error::internal(format!("pipeline task failed: {}", e))
}

async fn produce(
    lines: Vec<String>,
    tx: mpsc::Sender<String>,
    stats: Arc<StatsAggregator>,
    cancel: CancellationToken,
    flush_interval: Duration,
) -> u64 {
    let mut delta = StatsDelta::new();
    let mut dispatched = 0;

    for line in lines {
        if cancel.is_cancelled() {
            break;
        }

        // Counted before dispatch so no snapshot sees processed > total
        stats.record_seen(1);

        if is_skippable(&line) {
            delta.skipped += 1;
            stats.flush_if_due(&mut delta, flush_interval);
            continue;
        }

        let url = if line.trim().len() == line.len() {
            line
        } else {
            line.trim().to_string()
        };

        tokio::select! {
            biased;

            _ = cancel.cancelled() => break,
            sent = tx.send(url) => {
                if sent.is_err() {
                    break;
                }
            }
        }
        dispatched += 1;
    }

    stats.flush(&mut delta);
    debug!(dispatched, "Producer finished");
    dispatched
}

async fn next_url(rx: &Mutex<mpsc::Receiver<String>>) -> Option<String> {
    rx.lock().await.recv().await
}

async fn work(
    id: usize,
    classifier: Arc<dyn Classifier>,
    rx: Arc<Mutex<mpsc::Receiver<String>>>,
    tx: mpsc::Sender<ClassificationResult>,
    stats: Arc<StatsAggregator>,
    cancel: CancellationToken,
    flush_interval: Duration,
) -> u64 {
    let mut delta = StatsDelta::new();
    let mut emitted = 0;

    let mut ticker = tokio::time::interval(flush_interval.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await;

    loop {
        let url = tokio::select! {
            biased;

            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                stats.flush(&mut delta);
                continue;
            }
            next = next_url(&rx) => match next {
                Some(url) => url,
                None => break,
            },
        };

        match classifier.classify(&url).await {
            Verdict::Invalid => delta.invalid += 1,
            Verdict::Clean => delta.processed += 1,
            Verdict::Suspicious(result) => {
                tokio::select! {
                    biased;

                    _ = cancel.cancelled() => break,
                    sent = tx.send(result) => {
                        if sent.is_err() {
                            break;
                        }
                    }
                }
                delta.processed += 1;
                delta.suspicious += 1;
                emitted += 1;
            }
        }
    }

    stats.flush(&mut delta);
    debug!(worker = id, emitted, "Worker exiting");
    emitted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::UrlClassifier;
    use crate::config::OutputOrder;
    use crate::patterns::PatternSet;
    use crate::sink::MemorySink;
    use juicyurls_core::{Category, CategorySet};

    fn dispatcher(workers: usize) -> Dispatcher {
        let patterns = PatternSet::default()
            .with(Category::Extensions, [".exe"])
            .with(Category::Paths, ["/evil"]);
        let classifier = UrlClassifier::with_patterns(
            &patterns,
            CategorySet::parse(&["extensions", "paths"]).unwrap(),
            &[],
            true,
        )
        .unwrap();

        Dispatcher::new(
            Arc::new(classifier),
            DispatchSettings {
                workers,
                ..Default::default()
            },
        )
    }

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_state_transitions() {
        use PipelineState::*;
        assert!(Idle.can_transition_to(Running));
        assert!(Running.can_transition_to(Draining));
        assert!(Draining.can_transition_to(Done));
        assert!(Done.can_transition_to(Running));
        assert!(Running.can_transition_to(Cancelled));
        assert!(Draining.can_transition_to(Cancelled));

        assert!(!Idle.can_transition_to(Done));
        assert!(!Done.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Running));
        assert!(Done.is_terminal() && Cancelled.is_terminal());
    }

    #[test]
    fn test_effective_workers() {
        assert_eq!(effective_workers(100, 5), 1);
        assert_eq!(effective_workers(100, 50), 6);
        assert_eq!(effective_workers(100, 0), 1);
        assert_eq!(effective_workers(4, 50), 4);
        assert_eq!(effective_workers(10_000, 1_000_000), MAX_WORKERS);
        assert!(effective_workers(0, 1_000_000) >= 1);
        assert!(effective_workers(0, 20) <= 3);
    }

    #[tokio::test]
    async fn test_cycle_counts_and_collects() {
        let dispatcher = dispatcher(4);
        let stats = Arc::new(StatsAggregator::new());
        let mut sink = MemorySink::new();
        let mut collector = ResultCollector::new(&mut sink, OutputOrder::Sorted);

        let input = lines(&[
            "http://clean.com",
            "# comment",
            "",
            "  http://bad.com/evil  ",
            "http://bad.com/evil.exe",
            "://invalid-url",
            "// another comment",
        ]);

        let outcome = dispatcher
            .run_cycle(input, &stats, &mut collector, &CancellationToken::new())
            .await
            .unwrap();
        collector.finish().await.unwrap();

        assert!(outcome.completed);
        assert_eq!(outcome.dispatched, 4);
        assert_eq!(outcome.emitted, 2);
        assert_eq!(dispatcher.state(), PipelineState::Done);

        let snap = stats.snapshot();
        assert_eq!(snap.total, 7);
        assert_eq!(snap.skipped, 3);
        assert_eq!(snap.invalid, 1);
        assert_eq!(snap.processed, 3);
        assert_eq!(snap.suspicious, 2);
        assert_eq!(snap.total, snap.skipped + snap.invalid + snap.processed);

        assert_eq!(
            sink.urls(),
            vec!["http://bad.com/evil", "http://bad.com/evil.exe"]
        );
    }

    #[tokio::test]
    async fn test_cancelled_cycle() {
        let dispatcher = dispatcher(2);
        let stats = Arc::new(StatsAggregator::new());
        let mut sink = MemorySink::new();
        let mut collector = ResultCollector::new(&mut sink, OutputOrder::Sorted);

        let cancel = CancellationToken::new();
        cancel.cancel();

        let input = (0..500).map(|i| format!("http://x.com/{}/evil", i)).collect();
        let outcome = dispatcher
            .run_cycle(input, &stats, &mut collector, &cancel)
            .await
            .unwrap();

        assert!(!outcome.completed);
        assert_eq!(dispatcher.state(), PipelineState::Cancelled);

        let snap = stats.snapshot();
        assert!(snap.suspicious <= snap.processed);
        assert!(snap.processed <= snap.total);
        assert!(outcome.emitted <= outcome.dispatched);
    }

    #[tokio::test]
    async fn test_consecutive_cycles_reuse_dispatcher() {
        let dispatcher = dispatcher(2);
        let stats = Arc::new(StatsAggregator::new());
        let mut sink = MemorySink::new();
        let mut collector = ResultCollector::new(&mut sink, OutputOrder::Arrival);
        let mut states = dispatcher.subscribe();
        let cancel = CancellationToken::new();

        for chunk in [&["http://a.com/evil", "http://b.com"][..], &["http://a.com/evil"][..]] {
            let outcome = dispatcher
                .run_cycle(lines(chunk), &stats, &mut collector, &cancel)
                .await
                .unwrap();
            assert!(outcome.completed);
        }

        assert_eq!(*states.borrow_and_update(), PipelineState::Done);
        assert_eq!(collector.accepted(), 1);
        assert_eq!(collector.duplicates(), 1);
        assert_eq!(stats.snapshot().total, 3);
    }
}
