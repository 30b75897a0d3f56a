//! Configuration for classifiers and scan runs

use crate::patterns::PatternSet;
use crate::validation::DEFAULT_MAX_URL_LENGTH;
use juicyurls_core::{Category, CategorySet, Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Hard cap on the worker pool size; larger settings are clamped to it
pub const MAX_WORKERS: usize = 500;

/// Largest input file accepted by [`crate::input::open_input`]
pub const MAX_FILE_SIZE: u64 = 500 * 1024 * 1024;

/// Configuration for the URL classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Enabled category names; empty enables all four
    #[serde(default)]
    pub categories: Vec<String>,

    /// Exclusion patterns. Literal substrings, or a regex when prefixed `re:`
    #[serde(default)]
    pub excludes: Vec<String>,

    /// Reject syntactically invalid URLs before matching
    #[serde(default)]
    pub validate_urls: bool,

    /// URLs longer than this are rejected as invalid
    #[serde(default = "default_max_url_length")]
    pub max_url_length: usize,

    /// Replacement pattern tables
    #[serde(default)]
    pub patterns: PatternOverrides,
}

impl ClassifierConfig {
    /// Enabled categories, failing on unknown names
    pub fn enabled_categories(&self) -> Result<CategorySet> {
        CategorySet::parse(&self.categories)
    }

    /// Built-in tables with any configured overrides applied
    pub fn pattern_set(&self) -> PatternSet {
        let mut set = PatternSet::builtin();
        for category in Category::ALL {
            if let Some(patterns) = self.patterns.get(category) {
                set.set(category, patterns.clone());
            }
        }
        set
    }

    /// Replace the category list from a comma-separated string
    pub fn with_categories(mut self, raw: &str) -> Self {
        self.categories = parse_list(raw);
        self
    }

    /// Replace the exclusion list from a comma-separated string
    pub fn with_excludes(mut self, raw: &str) -> Self {
        self.excludes = parse_list(raw);
        self
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            categories: Vec::new(),
            excludes: Vec::new(),
            validate_urls: false,
            max_url_length: default_max_url_length(),
            patterns: PatternOverrides::default(),
        }
    }
}

/// Per-category replacements for the built-in tables
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatternOverrides {
    pub keywords: Option<Vec<String>>,
    pub extensions: Option<Vec<String>>,
    pub paths: Option<Vec<String>>,
    pub hidden: Option<Vec<String>>,
}

impl PatternOverrides {
    fn get(&self, category: Category) -> Option<&Vec<String>> {
        match category {
            Category::Keywords => self.keywords.as_ref(),
            Category::Extensions => self.extensions.as_ref(),
            Category::Paths => self.paths.as_ref(),
            Category::Hidden => self.hidden.as_ref(),
        }
    }
}

/// Order in which results reach the sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputOrder {
    /// Buffer accepted results and deliver them sorted by URL at the end
    #[default]
    Sorted,
    /// Deliver each result as soon as the collector accepts it
    Arrival,
}

impl FromStr for OutputOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sorted" => Ok(Self::Sorted),
            "arrival" => Ok(Self::Arrival),
            other => Err(Error::config(format!(
                "unknown output order '{}' (expected sorted or arrival)",
                other
            ))),
        }
    }
}

/// Configuration for a scan run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Worker count; 0 derives it from available parallelism. Values above
    /// [`MAX_WORKERS`] are clamped
    #[serde(default)]
    pub workers: usize,

    /// Run deadline in milliseconds; 0 disables it
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Inputs larger than this (or of unknown size) are processed in chunks
    #[serde(default = "default_chunk_threshold")]
    pub chunk_threshold_bytes: u64,

    /// Raw lines per chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Input queue capacity per worker
    #[serde(default = "default_queue_factor")]
    pub queue_factor: usize,

    /// Results queue capacity per worker
    #[serde(default = "default_results_factor")]
    pub results_factor: usize,

    /// How often workers fold their local counts into the shared stats
    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: u64,

    /// Log progress while running
    #[serde(default)]
    pub progress: bool,

    #[serde(default = "default_progress_interval_ms")]
    pub progress_interval_ms: u64,

    #[serde(default)]
    pub order: OutputOrder,

    /// Longest accepted input line in bytes
    #[serde(default = "default_max_line_bytes")]
    pub max_line_bytes: usize,
}

impl ScanConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }

    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }

    /// Whether an input of the given size goes through the chunked path
    pub fn is_chunked(&self, size_hint: Option<u64>) -> bool {
        match size_hint {
            Some(size) => size > self.chunk_threshold_bytes,
            None => true,
        }
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::config("chunk_size must be greater than 0"));
        }
        if self.queue_factor == 0 || self.results_factor == 0 {
            return Err(Error::config("queue factors must be greater than 0"));
        }
        if self.flush_interval_ms == 0 || self.progress_interval_ms == 0 {
            return Err(Error::config("intervals must be greater than 0"));
        }
        if self.max_line_bytes == 0 {
            return Err(Error::config("max_line_bytes must be greater than 0"));
        }
        Ok(())
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            timeout_ms: default_timeout_ms(),
            chunk_threshold_bytes: default_chunk_threshold(),
            chunk_size: default_chunk_size(),
            queue_factor: default_queue_factor(),
            results_factor: default_results_factor(),
            flush_interval_ms: default_flush_interval_ms(),
            progress: false,
            progress_interval_ms: default_progress_interval_ms(),
            order: OutputOrder::default(),
            max_line_bytes: default_max_line_bytes(),
        }
    }
}

/// Split a comma-separated list, trimming entries and dropping empty ones
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn default_max_url_length() -> usize {
    DEFAULT_MAX_URL_LENGTH
}

fn default_timeout_ms() -> u64 {
    300_000
}

fn default_chunk_threshold() -> u64 {
    50 * 1024 * 1024
}

fn default_chunk_size() -> usize {
    50_000
}

fn default_queue_factor() -> usize {
    4
}

fn default_results_factor() -> usize {
    2
}

fn default_flush_interval_ms() -> u64 {
    5_000
}

fn default_progress_interval_ms() -> u64 {
    10_000
}

fn default_max_line_bytes() -> usize {
    1024 * 1024
}
