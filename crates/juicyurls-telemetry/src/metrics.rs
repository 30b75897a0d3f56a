//! Metric names and recording helpers
//!
//! Counters go through the `metrics` facade. With no recorder installed they
//! are no-ops.

pub const URLS_TOTAL: &str = "juicyurls_urls_total";
pub const URLS_PROCESSED: &str = "juicyurls_urls_processed_total";
pub const URLS_SUSPICIOUS: &str = "juicyurls_urls_suspicious_total";
pub const URLS_INVALID: &str = "juicyurls_urls_invalid_total";
pub const URLS_SKIPPED: &str = "juicyurls_urls_skipped_total";
pub const STATS_FLUSHES: &str = "juicyurls_stats_flushes_total";
pub const CHUNKS: &str = "juicyurls_chunks_total";

/// Register descriptions for every counter
pub fn describe_metrics() {
    metrics::describe_counter!(URLS_TOTAL, "Input lines seen before filtering");
    metrics::describe_counter!(URLS_PROCESSED, "URLs that passed validation and were classified");
    metrics::describe_counter!(URLS_SUSPICIOUS, "URLs matching an enabled category");
    metrics::describe_counter!(URLS_INVALID, "URLs rejected by validation");
    metrics::describe_counter!(URLS_SKIPPED, "Blank and comment lines");
    metrics::describe_counter!(STATS_FLUSHES, "Worker statistics flushes");
    metrics::describe_counter!(CHUNKS, "Input chunks dispatched through the pipeline");
}

pub(crate) fn record_flush(suspicious: u64, invalid: u64, processed: u64, skipped: u64) {
    metrics::counter!(URLS_SUSPICIOUS).increment(suspicious);
    metrics::counter!(URLS_INVALID).increment(invalid);
    metrics::counter!(URLS_PROCESSED).increment(processed);
    metrics::counter!(URLS_SKIPPED).increment(skipped);
    metrics::counter!(STATS_FLUSHES).increment(1);
}

/// Count one dispatched chunk
pub fn record_chunk() {
    metrics::counter!(CHUNKS).increment(1);
}
