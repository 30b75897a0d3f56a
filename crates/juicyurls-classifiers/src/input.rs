//! Line-oriented input
//!
//! Input is newline-delimited UTF-8, one URL per line. Limits on file size
//! and line length are enforced here, before anything is dispatched.

use juicyurls_core::{Error, Result};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, BufReader};

/// Whether a line is blank or a `#` / `//` comment
pub fn is_skippable(line: &str) -> bool {
    let line = line.trim();
    line.is_empty() || line.starts_with('#') || line.starts_with("//")
}

/// Reads lines with a hard per-line byte limit
pub struct LineReader<R> {
    inner: R,
    max_line_bytes: usize,
    buf: Vec<u8>,
    line_no: u64,
}

impl<R: AsyncBufRead + Unpin> LineReader<R> {
    pub fn new(inner: R, max_line_bytes: usize) -> Self {
        Self {
            inner,
            max_line_bytes,
            buf: Vec::new(),
            line_no: 0,
        }
    }

    /// Next line without its terminator, or `None` at end of input
    ///
    /// A line over the limit or containing invalid UTF-8 is an input error.
    pub async fn next_line(&mut self) -> Result<Option<String>> {
        self.buf.clear();

        // Room for the limit plus a "\r\n" terminator
        let limit = self.max_line_bytes as u64 + 2;
        let read = (&mut self.inner)
            .take(limit)
            .read_until(b'\n', &mut self.buf)
            .await?;
        if read == 0 {
            return Ok(None);
        }
        self.line_no += 1;

        let mut end = self.buf.len();
        if self.buf.last() == Some(&b'\n') {
            end -= 1;
            if end > 0 && self.buf[end - 1] == b'\r' {
                end -= 1;
            }
        }

        if end > self.max_line_bytes {
            return Err(Error::input(format!(
                "line {} exceeds the maximum length of {} bytes",
                self.line_no, self.max_line_bytes
            )));
        }

        match std::str::from_utf8(&self.buf[..end]) {
            Ok(line) => Ok(Some(line.to_string())),
            Err(e) => Err(Error::input(format!(
                "line {} is not valid UTF-8: {}",
                self.line_no, e
            ))),
        }
    }

    /// Read up to `limit` lines. An empty vector means end of input.
    pub async fn read_chunk(&mut self, limit: usize) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        while lines.len() < limit {
            match self.next_line().await? {
                Some(line) => lines.push(line),
                None => break,
            }
        }
        Ok(lines)
    }

    /// Lines read so far
    pub fn lines_read(&self) -> u64 {
        self.line_no
    }
}

/// Open an input file after checking it exists, is a regular file and is at
/// most `max_size` bytes
///
/// Returns the reader together with the file size, used as the chunking hint.
pub async fn open_input(
    path: impl AsRef<Path>,
    max_size: u64,
    max_line_bytes: usize,
) -> Result<(LineReader<BufReader<File>>, u64)> {
    let path = path.as_ref();

    let metadata = match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::input(format!(
                "input file does not exist: {}",
                path.display()
            )));
        }
        Err(e) => {
            return Err(Error::input(format!(
                "cannot access {}: {}",
                path.display(),
                e
            )));
        }
    };

    if !metadata.is_file() {
        return Err(Error::input(format!(
            "input path is not a regular file: {}",
            path.display()
        )));
    }

    let size = metadata.len();
    if size > max_size {
        return Err(Error::input(format!(
            "input file is too large: {} bytes (limit {} bytes)",
            size, max_size
        )));
    }

    let file = File::open(path)
        .await
        .map_err(|e| Error::input(format!("cannot open {}: {}", path.display(), e)))?;

    Ok((LineReader::new(BufReader::new(file), max_line_bytes), size))
}
