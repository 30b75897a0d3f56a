//! Mock classifiers for testing
//!
//! Provides configurable mock implementations of the Classifier trait for
//! exercising the pipeline's timeout, abort and backpressure paths.

use async_trait::async_trait;
use juicyurls_classifiers::{Classifier, MemorySink, ResultSink, RunStatus, ScanConfig, Scanner};
use juicyurls_core::{Category, ClassificationResult, Result, Verdict};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// A configurable mock classifier for testing
///
/// Flags every URL containing the marker as a keyword hit and reports
/// URLs starting with `invalid:` as invalid.
pub struct MockClassifier {
    name: String,
    marker: String,
    simulated_latency: Option<Duration>,
    call_count: AtomicU32,
}

impl MockClassifier {
    /// Create a new mock classifier with the given name
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            marker: "suspicious".to_string(),
            simulated_latency: None,
            call_count: AtomicU32::new(0),
        }
    }

    /// Set the substring that marks a URL as suspicious
    pub fn with_marker(mut self, marker: &str) -> Self {
        self.marker = marker.to_string();
        self
    }

    /// Set simulated latency for this classifier
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.simulated_latency = Some(latency);
        self
    }

    /// Get the number of times classify was called
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Classifier for MockClassifier {
    async fn classify(&self, url: &str) -> Verdict {
        self.call_count.fetch_add(1, Ordering::Relaxed);

        if let Some(latency) = self.simulated_latency {
            tokio::time::sleep(latency).await;
        }

        if url.starts_with("invalid:") {
            Verdict::Invalid
        } else if url.contains(&self.marker) {
            Verdict::Suspicious(ClassificationResult::new(url, Category::Keywords))
        } else {
            Verdict::Clean
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A sink that takes a fixed time per result
pub struct SlowSink {
    delay: Duration,
    inner: MemorySink,
}

impl SlowSink {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            inner: MemorySink::new(),
        }
    }
}

#[async_trait]
impl ResultSink for SlowSink {
    async fn accept(&mut self, result: &ClassificationResult) -> Result<()> {
        tokio::time::sleep(self.delay).await;
        self.inner.accept(result).await
    }

    async fn finish(&mut self) -> Result<()> {
        self.inner.finish().await
    }
}

fn urls(count: usize, marker: &str) -> Vec<String> {
    (0..count)
        .map(|i| format!("http://host{}.example.com/{}", i, marker))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_classifier_basic() {
        let classifier = MockClassifier::new("test").with_marker("bad");

        assert!(classifier.classify("http://x.com/bad").await.is_suspicious());
        assert_eq!(classifier.classify("http://x.com/ok").await, Verdict::Clean);
        assert_eq!(classifier.classify("invalid:bad").await, Verdict::Invalid);
        assert_eq!(classifier.call_count(), 3);
    }

    #[tokio::test]
    async fn test_every_dispatched_url_classified_once() {
        let classifier = Arc::new(MockClassifier::new("counting"));
        let config = ScanConfig {
            workers: 8,
            ..Default::default()
        };
        let scanner = Scanner::new(classifier.clone(), config).unwrap();

        let mut lines = urls(3000, "suspicious");
        lines.extend(urls(1000, "clean"));
        lines.extend(["", "# comment", "invalid:x"].iter().map(|s| s.to_string()));

        let mut sink = MemorySink::new();
        let report = scanner
            .run_lines(lines, &mut sink, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.status, RunStatus::Completed);
        assert_eq!(classifier.call_count(), 4001);
        assert_eq!(report.stats.total, 4003);
        assert_eq!(report.stats.skipped, 2);
        assert_eq!(report.stats.invalid, 1);
        assert_eq!(report.stats.processed, 4000);
        assert_eq!(report.stats.suspicious, 3000);
        assert_eq!(report.emitted, 3000);
        assert_eq!(sink.results.len(), 3000);
        assert_eq!(report.workers, 8);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_returns_partial_results() {
        let latency = Duration::from_millis(20);
        let timeout = Duration::from_millis(200);
        let classifier = Arc::new(MockClassifier::new("slow").with_latency(latency));
        let config = ScanConfig {
            workers: 4,
            timeout_ms: timeout.as_millis() as u64,
            ..Default::default()
        };
        let scanner = Scanner::new(classifier, config).unwrap();

        let started = tokio::time::Instant::now();
        let mut sink = MemorySink::new();
        let report = scanner
            .run_lines(urls(2000, "suspicious"), &mut sink, &CancellationToken::new())
            .await
            .unwrap();

        // Each worker may finish the item it was classifying at the deadline
        assert!(started.elapsed() <= timeout + latency * 2);
        assert_eq!(report.status, RunStatus::TimedOut);

        assert!(report.emitted > 0);
        assert_eq!(sink.results.len() as u64, report.emitted);
        assert_eq!(report.stats.suspicious, report.emitted);
        assert!(report.stats.processed < report.stats.total);
        assert!(report.stats.total <= 2000);
        assert!(sink.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_abort_is_distinct_from_timeout() {
        let classifier =
            Arc::new(MockClassifier::new("slow").with_latency(Duration::from_millis(10)));
        let scanner = Scanner::new(classifier, ScanConfig::default()).unwrap();

        let abort = CancellationToken::new();
        let trigger = abort.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let mut sink = MemorySink::new();
        let report = scanner
            .run_lines(urls(5000, "suspicious"), &mut sink, &abort)
            .await
            .unwrap();

        assert_eq!(report.status, RunStatus::Aborted);
        assert!(report.stats.processed <= report.stats.total);
        assert_eq!(sink.results.len() as u64, report.emitted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_results_queue_does_not_deadlock() {
        let classifier = Arc::new(MockClassifier::new("fast"));
        let config = ScanConfig {
            workers: 4,
            timeout_ms: 100,
            order: juicyurls_classifiers::OutputOrder::Arrival,
            ..Default::default()
        };
        let scanner = Scanner::new(classifier, config).unwrap();

        let mut sink = SlowSink::new(Duration::from_millis(50));
        let report = scanner
            .run_lines(urls(2000, "suspicious"), &mut sink, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.status, RunStatus::TimedOut);
        assert_eq!(sink.inner.results.len() as u64, report.emitted);
        assert!(report.emitted < 2000);
    }
}
