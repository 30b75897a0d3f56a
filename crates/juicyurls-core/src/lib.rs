//! JuicyURLs Core
//!
//! Core types and utilities shared across JuicyURLs components.
//!
//! This crate provides:
//! - URL categories and the enabled-category set
//! - Classification results and per-URL verdicts
//! - Run statistics
//! - Error types and result handling

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{Category, CategorySet, ClassificationResult, RunStats, Verdict};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{Category, CategorySet, ClassificationResult, RunStats, Verdict};
}
