//! Run orchestration
//!
//! A [`Scanner`] drives one or more pipeline cycles over an input, arms the
//! run deadline, and turns the outcome into a [`RunReport`]. Large inputs
//! (or inputs of unknown size) are read in chunks; stats and dedup carry
//! across chunks.

use crate::classifier::{Classifier, UrlClassifier};
use crate::collector::ResultCollector;
use crate::config::{ClassifierConfig, ScanConfig, MAX_WORKERS};
use crate::input::LineReader;
use crate::pipeline::{DispatchSettings, Dispatcher, PipelineState};
use crate::sink::ResultSink;
use async_trait::async_trait;
use juicyurls_core::{Error, Result, RunStats};
use juicyurls_telemetry::{metrics, spawn_progress_reporter, StatsAggregator};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::AsyncBufRead;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// All input was processed
    Completed,
    /// The deadline expired; results and stats are partial
    TimedOut,
    /// The caller's abort token fired; results and stats are partial
    Aborted,
}

impl RunStatus {
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Summary of a finished run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub status: RunStatus,
    pub stats: RunStats,
    pub elapsed: Duration,
    /// Unique results delivered to the sink
    pub emitted: u64,
    /// Pipeline cycles run
    pub chunks: u64,
    /// Largest worker pool used by any cycle
    pub workers: usize,
}

impl RunReport {
    pub fn rate(&self) -> f64 {
        self.stats.rate(self.elapsed)
    }
}

/// Cancels a run when its timeout expires
struct DeadlineGuard {
    fired: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl DeadlineGuard {
    fn arm(timeout: Option<Duration>, run: &CancellationToken) -> Self {
        let fired = Arc::new(AtomicBool::new(false));

        let handle = timeout.map(|timeout| {
            let fired = Arc::clone(&fired);
            let run = run.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = run.cancelled() => {}
                    _ = tokio::time::sleep(timeout) => {
                        fired.store(true, Ordering::SeqCst);
                        warn!(timeout_ms = timeout.as_millis() as u64, "Deadline reached, cancelling run");
                        run.cancel();
                    }
                }
            })
        });

        Self { fired, handle }
    }

    fn fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }
}

impl Drop for DeadlineGuard {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

pub struct Scanner {
    dispatcher: Dispatcher,
    config: ScanConfig,
}

impl Scanner {
    pub fn new(classifier: Arc<dyn Classifier>, config: ScanConfig) -> Result<Self> {
        config.validate()?;
        if config.workers > MAX_WORKERS {
            warn!(
                requested = config.workers,
                max = MAX_WORKERS,
                "Worker count above the cap, clamping"
            );
        }
        info!(
            classifier = classifier.name(),
            workers = config.workers,
            timeout_ms = config.timeout_ms,
            "Scanner configured"
        );

        Ok(Self {
            dispatcher: Dispatcher::new(classifier, DispatchSettings::from(&config)),
            config,
        })
    }

    /// Build a scanner around a [`UrlClassifier`]
    pub fn from_config(classifier: &ClassifierConfig, config: ScanConfig) -> Result<Self> {
        Self::new(Arc::new(UrlClassifier::new(classifier)?), config)
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Watch the dispatcher's state
    pub fn subscribe(&self) -> watch::Receiver<PipelineState> {
        self.dispatcher.subscribe()
    }

    /// Classify every line of `reader`, delivering results to `sink`
    ///
    /// `size_hint` is the input size in bytes when known; it selects the
    /// chunked path. A timeout or `abort` ends the run early with a partial
    /// report. Errors are reserved for unreadable input, sink failures and
    /// panicked tasks. Results accepted before an input error are still
    /// handed to the sink and finished.
    pub async fn run<R>(
        &self,
        mut reader: LineReader<R>,
        size_hint: Option<u64>,
        sink: &mut dyn ResultSink,
        abort: &CancellationToken,
    ) -> Result<RunReport>
    where
        R: AsyncBufRead + Unpin + Send,
    {
        self.execute(&mut reader, size_hint, sink, abort).await
    }

    /// Classify in-memory lines. Each entry is treated as one input line.
    pub async fn run_lines(
        &self,
        lines: Vec<String>,
        sink: &mut dyn ResultSink,
        abort: &CancellationToken,
    ) -> Result<RunReport> {
        let size = lines.iter().map(|line| line.len() as u64 + 1).sum();
        let mut source = InMemoryLines(lines.into_iter());
        self.execute(&mut source, Some(size), sink, abort).await
    }

    async fn execute(
        &self,
        source: &mut dyn ChunkSource,
        size_hint: Option<u64>,
        sink: &mut dyn ResultSink,
        abort: &CancellationToken,
    ) -> Result<RunReport> {
        let started = Instant::now();
        let run = abort.child_token();
        let deadline = DeadlineGuard::arm(self.config.timeout(), &run);
        let stats = Arc::new(StatsAggregator::new());

        let stop_progress = run.child_token();
        let progress = self.config.progress.then(|| {
            spawn_progress_reporter(
                Arc::clone(&stats),
                self.config.progress_interval(),
                stop_progress.clone(),
            )
        });

        self.dispatcher.reset();
        let mut collector = ResultCollector::new(sink, self.config.order);

        let chunked = self.config.is_chunked(size_hint);
        let limit = if chunked {
            self.config.chunk_size
        } else {
            usize::MAX
        };
        debug!(chunked, ?size_hint, "Reading input");

        let mut chunks = 0;
        let mut workers = 0;
        let mut completed = true;
        let outcome = async {
            loop {
                let lines = tokio::select! {
                    biased;

                    _ = run.cancelled() => {
                        completed = false;
                        break;
                    }
                    lines = source.next_chunk(limit) => lines?,
                };
                if lines.is_empty() {
                    break;
                }

                chunks += 1;
                metrics::record_chunk();
                if chunked {
                    info!(chunk = chunks, lines = lines.len(), "Processing chunk");
                }

                let cycle = self
                    .dispatcher
                    .run_cycle(lines, &stats, &mut collector, &run)
                    .await?;
                workers = workers.max(cycle.workers);

                if !cycle.completed {
                    completed = false;
                    break;
                }
                if !chunked {
                    break;
                }
            }
            Ok::<(), Error>(())
        }
        .await;

        stop_progress.cancel();
        if let Some(handle) = progress {
            let _ = handle.await;
        }

        if let Err(e) = outcome {
            if let Err(finish) = collector.finish().await {
                warn!("Failed to finish sink after run error: {}", finish);
            }
            return Err(e);
        }
        let emitted = collector.finish().await?;

        let status = if completed {
            RunStatus::Completed
        } else if deadline.fired() {
            RunStatus::TimedOut
        } else {
            RunStatus::Aborted
        };

        let report = RunReport {
            status,
            stats: stats.snapshot(),
            elapsed: started.elapsed(),
            emitted,
            chunks,
            workers,
        };

        info!(
            status = ?report.status,
            total = report.stats.total,
            processed = report.stats.processed,
            suspicious = report.stats.suspicious,
            invalid = report.stats.invalid,
            skipped = report.stats.skipped,
            emitted = report.emitted,
            chunks = report.chunks,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Scan finished"
        );

        Ok(report)
    }
}

/// Where a run pulls its lines from, one chunk at a time
#[async_trait]
trait ChunkSource: Send {
    /// Up to `limit` lines; empty at end of input
    async fn next_chunk(&mut self, limit: usize) -> Result<Vec<String>>;
}

#[async_trait]
impl<R> ChunkSource for LineReader<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn next_chunk(&mut self, limit: usize) -> Result<Vec<String>> {
        self.read_chunk(limit).await
    }
}

struct InMemoryLines(std::vec::IntoIter<String>);

#[async_trait]
impl ChunkSource for InMemoryLines {
    async fn next_chunk(&mut self, limit: usize) -> Result<Vec<String>> {
        Ok(self.0.by_ref().take(limit).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputOrder;
    use crate::sink::MemorySink;
    use std::io::Cursor;

    fn scanner(config: ScanConfig) -> Scanner {
        let classifier = ClassifierConfig::default().with_categories("paths");
        Scanner::from_config(&classifier, config).unwrap()
    }

    #[tokio::test]
    async fn test_empty_input_completes() {
        let scanner = scanner(ScanConfig::default());
        let mut sink = MemorySink::new();

        let report = scanner
            .run_lines(Vec::new(), &mut sink, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.status, RunStatus::Completed);
        assert_eq!(report.chunks, 0);
        assert_eq!(report.stats, RunStats::default());
        assert!(sink.is_finished());
    }

    #[tokio::test]
    async fn test_aborted_before_start() {
        let scanner = scanner(ScanConfig::default());
        let mut sink = MemorySink::new();
        let abort = CancellationToken::new();
        abort.cancel();

        let report = scanner
            .run_lines(vec!["http://x.com/admin".into()], &mut sink, &abort)
            .await
            .unwrap();

        assert_eq!(report.status, RunStatus::Aborted);
        assert!(!report.status.is_complete());
        assert!(sink.is_finished());
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let config = ScanConfig {
            chunk_size: 0,
            ..Default::default()
        };
        let classifier = ClassifierConfig::default();
        assert!(Scanner::from_config(&classifier, config).is_err());
    }

    #[tokio::test]
    async fn test_blank_entries_are_counted() {
        let scanner = scanner(ScanConfig::default());
        let mut sink = MemorySink::new();

        let report = scanner
            .run_lines(
                vec!["http://a.com/admin/".into(), "".into(), "   ".into()],
                &mut sink,
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(report.stats.total, 3);
        assert_eq!(report.stats.skipped, 2);
        assert_eq!(report.stats.suspicious, 1);

        let mut sink = MemorySink::new();
        let report = scanner
            .run_lines(vec![String::new()], &mut sink, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(report.chunks, 1);
        assert_eq!(report.stats.total, 1);
        assert_eq!(report.stats.skipped, 1);
    }

    #[tokio::test]
    async fn test_worker_count_is_clamped() {
        let scanner = scanner(ScanConfig {
            workers: 1000,
            ..Default::default()
        });
        let lines: Vec<String> = (0..5000)
            .map(|i| format!("http://site{}.com/admin/", i))
            .collect();
        let mut sink = MemorySink::new();

        let report = scanner
            .run_lines(lines, &mut sink, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.status, RunStatus::Completed);
        assert_eq!(report.workers, MAX_WORKERS);
        assert_eq!(report.stats.suspicious, 5000);
    }

    #[tokio::test]
    async fn test_input_error_still_finishes_sink() {
        let scanner = scanner(ScanConfig {
            chunk_threshold_bytes: 0,
            chunk_size: 2,
            order: OutputOrder::Arrival,
            ..Default::default()
        });
        let data = format!(
            "http://a.com/admin/\nhttp://b.com/admin/\nhttp://{}.com/\n",
            "x".repeat(100)
        );
        let reader = LineReader::new(Cursor::new(data.into_bytes()), 64);
        let mut sink = MemorySink::new();

        let err = scanner
            .run(reader, None, &mut sink, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Input(_)));
        assert!(sink.is_finished());
        assert_eq!(sink.results.len(), 2);
    }
}
