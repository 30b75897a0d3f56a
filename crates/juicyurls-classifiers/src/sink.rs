//! Result sinks
//!
//! A sink receives every accepted [`ClassificationResult`] once, in the order
//! chosen by the collector, and is finished exactly once at the end of a run.

use async_trait::async_trait;
use juicyurls_core::{ClassificationResult, Error, Result};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter, Stdout};

/// Consumer of suspicious results
#[async_trait]
pub trait ResultSink: Send {
    /// Accept one result
    async fn accept(&mut self, result: &ClassificationResult) -> Result<()>;

    /// Flush anything buffered. Called once, after the last result.
    async fn finish(&mut self) -> Result<()>;
}

/// How a result is rendered as a line of text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// The bare URL
    #[default]
    Terse,
    /// `<url> [<category>: <reason>]`
    Verbose,
}

impl OutputFormat {
    pub fn render(&self, result: &ClassificationResult) -> String {
        match self {
            Self::Terse => result.url.clone(),
            Self::Verbose => result.to_string(),
        }
    }
}

/// Line-per-result sink over any async writer
pub struct WriterSink<W> {
    writer: BufWriter<W>,
    format: OutputFormat,
    written: u64,
}

impl<W: AsyncWrite + Unpin + Send> WriterSink<W> {
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self {
            writer: BufWriter::new(writer),
            format,
            written: 0,
        }
    }

    /// Lines written so far
    pub fn written(&self) -> u64 {
        self.written
    }
}

impl WriterSink<Stdout> {
    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(tokio::io::stdout(), format)
    }
}

impl WriterSink<File> {
    /// Create or truncate `path`
    pub async fn create(path: impl AsRef<Path>, format: OutputFormat) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).await.map_err(|e| {
            Error::sink(format!("cannot create output file {}: {}", path.display(), e))
        })?;
        Ok(Self::new(file, format))
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> ResultSink for WriterSink<W> {
    async fn accept(&mut self, result: &ClassificationResult) -> Result<()> {
        let mut line = self.format.render(result);
        line.push('\n');
        self.writer
            .write_all(line.as_bytes())
            .await
            .map_err(|e| Error::sink(format!("write failed: {}", e)))?;
        self.written += 1;
        Ok(())
    }

    async fn finish(&mut self) -> Result<()> {
        self.writer
            .flush()
            .await
            .map_err(|e| Error::sink(format!("flush failed: {}", e)))
    }
}

/// Sink that keeps results in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub results: Vec<ClassificationResult>,
    finished: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn urls(&self) -> Vec<&str> {
        self.results.iter().map(|r| r.url.as_str()).collect()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

#[async_trait]
impl ResultSink for MemorySink {
    async fn accept(&mut self, result: &ClassificationResult) -> Result<()> {
        self.results.push(result.clone());
        Ok(())
    }

    async fn finish(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }
}
