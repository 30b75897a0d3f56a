//! JuicyURLs Telemetry
//!
//! Statistics and progress reporting for scan runs.
//!
//! Provides:
//! - Contention-free run statistics with periodic flushes
//! - Counters through the `metrics` facade
//! - A progress reporter for long runs

pub mod metrics;
pub mod progress;
pub mod stats;

pub use progress::spawn_progress_reporter;
pub use stats::{StatsAggregator, StatsDelta};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::progress::spawn_progress_reporter;
    pub use crate::stats::{StatsAggregator, StatsDelta};
}
