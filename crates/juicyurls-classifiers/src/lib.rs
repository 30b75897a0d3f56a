//! JuicyURLs Classifiers
//!
//! Pattern-based URL classification and the concurrent pipeline that runs
//! it over large URL lists.
//!
//! - [`PatternMatcher`] compiles category and exclusion patterns once
//! - [`UrlClassifier`] adds the optional validity gate
//! - [`Dispatcher`] fans lines out to a bounded worker pool and collects
//!   deduplicated results
//! - [`Scanner`] runs the dispatcher over an input, in chunks when large,
//!   under a deadline

pub mod classifier;
pub mod collector;
pub mod config;
pub mod dedup;
pub mod input;
pub mod patterns;
pub mod pipeline;
pub mod scanner;
pub mod sink;
pub mod suspicious;
pub mod validation;

pub use classifier::{Classifier, UrlClassifier};
pub use collector::ResultCollector;
pub use config::{
    parse_list, ClassifierConfig, OutputOrder, PatternOverrides, ScanConfig, MAX_FILE_SIZE,
    MAX_WORKERS,
};
pub use dedup::{remove_duplicates, Deduplicator};
pub use input::{is_skippable, open_input, LineReader};
pub use patterns::{PatternMatcher, PatternSet};
pub use pipeline::{effective_workers, CycleOutcome, DispatchSettings, Dispatcher, PipelineState};
pub use scanner::{RunReport, RunStatus, Scanner};
pub use sink::{MemorySink, OutputFormat, ResultSink, WriterSink};
pub use validation::{is_valid_url, DEFAULT_MAX_URL_LENGTH};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::{Classifier, UrlClassifier};
    pub use crate::config::{ClassifierConfig, OutputOrder, ScanConfig};
    pub use crate::input::{open_input, LineReader};
    pub use crate::patterns::{PatternMatcher, PatternSet};
    pub use crate::scanner::{RunReport, RunStatus, Scanner};
    pub use crate::sink::{MemorySink, OutputFormat, ResultSink, WriterSink};
    pub use juicyurls_core::prelude::*;
}
