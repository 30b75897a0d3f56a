//! Fan-in side of the pipeline
//!
//! The collector is the sole owner of the dedup set and the only writer to
//! the sink. It lives for a whole run so dedup spans every chunk.

use crate::config::OutputOrder;
use crate::dedup::Deduplicator;
use crate::sink::ResultSink;
use juicyurls_core::{ClassificationResult, Result};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub struct ResultCollector<'a> {
    dedup: Deduplicator,
    order: OutputOrder,
    buffered: Vec<ClassificationResult>,
    sink: &'a mut dyn ResultSink,
    accepted: u64,
    duplicates: u64,
}

impl<'a> ResultCollector<'a> {
    pub fn new(sink: &'a mut dyn ResultSink, order: OutputOrder) -> Self {
        Self {
            dedup: Deduplicator::new(),
            order,
            buffered: Vec::new(),
            sink,
            accepted: 0,
            duplicates: 0,
        }
    }

    /// Accept a result unless its URL was already seen
    pub async fn accept(&mut self, result: ClassificationResult) -> Result<bool> {
        if !self.dedup.insert(&result.url) {
            self.duplicates += 1;
            return Ok(false);
        }

        self.accepted += 1;
        match self.order {
            OutputOrder::Sorted => self.buffered.push(result),
            OutputOrder::Arrival => self.sink.accept(&result).await?,
        }
        Ok(true)
    }

    /// Drain `rx` until it closes or `cancel` fires
    ///
    /// Returns `true` when the queue closed normally. On cancellation, results
    /// already sitting in the queue are still accepted.
    pub async fn drain(
        &mut self,
        rx: &mut mpsc::Receiver<ClassificationResult>,
        cancel: &CancellationToken,
    ) -> Result<bool> {
        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    let late = self.drain_ready(rx).await?;
                    debug!(late, "Collector cancelled");
                    return Ok(false);
                }
                next = rx.recv() => match next {
                    Some(result) => {
                        self.accept(result).await?;
                    }
                    None => return Ok(true),
                },
            }
        }
    }

    /// Accept whatever is queued right now without waiting
    pub async fn drain_ready(
        &mut self,
        rx: &mut mpsc::Receiver<ClassificationResult>,
    ) -> Result<usize> {
        let mut drained = 0;
        while let Ok(result) = rx.try_recv() {
            self.accept(result).await?;
            drained += 1;
        }
        Ok(drained)
    }

    /// Unique results accepted so far
    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    pub fn duplicates(&self) -> u64 {
        self.duplicates
    }

    /// Deliver buffered results and finish the sink
    pub async fn finish(mut self) -> Result<u64> {
        if self.order == OutputOrder::Sorted {
            self.buffered.sort_by(|a, b| a.url.cmp(&b.url));
            for result in &self.buffered {
                self.sink.accept(result).await?;
            }
        }

        self.sink.finish().await?;
        Ok(self.accepted)
    }
}
