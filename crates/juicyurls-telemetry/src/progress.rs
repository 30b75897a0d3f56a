//! Periodic progress logging

use crate::stats::StatsAggregator;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Spawn a task that logs a progress line every `every` until `stop` fires
pub fn spawn_progress_reporter(
    stats: Arc<StatsAggregator>,
    every: Duration,
    stop: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let started = Instant::now();
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = stop.cancelled() => break,
                _ = ticker.tick() => {
                    let snap = stats.snapshot();
                    info!(
                        total = snap.total,
                        processed = snap.processed,
                        suspicious = snap.suspicious,
                        invalid = snap.invalid,
                        "Progress: {:.0} URLs/sec",
                        snap.rate(started.elapsed())
                    );
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_reporter_stops_on_cancel() {
        let stats = Arc::new(StatsAggregator::new());
        let stop = CancellationToken::new();
        let handle = spawn_progress_reporter(stats, Duration::from_secs(10), stop.clone());

        tokio::time::sleep(Duration::from_secs(25)).await;
        stop.cancel();

        handle.await.unwrap();
    }
}
