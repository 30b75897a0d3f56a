//! Core types for JuicyURLs

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// One of the four independent suspicious-signal classes
///
/// Variants are declared in precedence order: when a URL matches several
/// categories only the first one is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Sensitive words anywhere in the URL
    Keywords,
    /// Risky file extensions at the end of the URL
    Extensions,
    /// Administrative or internal path fragments
    Paths,
    /// Dotfiles and hidden directories
    Hidden,
}

impl Category {
    /// All categories in precedence order
    pub const ALL: [Category; 4] = [
        Category::Keywords,
        Category::Extensions,
        Category::Paths,
        Category::Hidden,
    ];

    /// Lowercase name used in config and output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Keywords => "keywords",
            Self::Extensions => "extensions",
            Self::Paths => "paths",
            Self::Hidden => "hidden",
        }
    }

    /// Human-readable reason attached to results of this category
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Keywords => "Contains suspicious keyword",
            Self::Extensions => "Suspicious file extension",
            Self::Paths => "Suspicious path pattern",
            Self::Hidden => "Hidden file or directory",
        }
    }

    fn bit(&self) -> u8 {
        1 << (*self as u8)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keywords" => Ok(Self::Keywords),
            "extensions" => Ok(Self::Extensions),
            "paths" => Ok(Self::Paths),
            "hidden" => Ok(Self::Hidden),
            other => Err(Error::config(format!(
                "unknown category '{}' (expected keywords, extensions, paths or hidden)",
                other
            ))),
        }
    }
}

/// Set of enabled categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategorySet(u8);

impl CategorySet {
    /// Every category enabled
    pub fn all() -> Self {
        Category::ALL.iter().copied().collect()
    }

    /// No category enabled
    pub fn empty() -> Self {
        Self(0)
    }

    /// Parse names such as `["keywords", "paths"]`; an empty list enables all
    pub fn parse<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        let names: Vec<&str> = names
            .iter()
            .map(|n| n.as_ref().trim())
            .filter(|n| !n.is_empty())
            .collect();

        if names.is_empty() {
            return Ok(Self::all());
        }

        names.into_iter().map(Category::from_str).collect()
    }

    pub fn insert(&mut self, category: Category) {
        self.0 |= category.bit();
    }

    pub fn remove(&mut self, category: Category) {
        self.0 &= !category.bit();
    }

    pub fn contains(&self, category: Category) -> bool {
        self.0 & category.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Enabled categories in precedence order
    pub fn iter(&self) -> impl Iterator<Item = Category> + '_ {
        Category::ALL.into_iter().filter(|c| self.contains(*c))
    }
}

impl Default for CategorySet {
    fn default() -> Self {
        Self::all()
    }
}

impl FromIterator<Category> for CategorySet {
    fn from_iter<I: IntoIterator<Item = Category>>(iter: I) -> Self {
        let mut set = Self::empty();
        for category in iter {
            set.insert(category);
        }
        set
    }
}

/// A suspicious URL, produced once per match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// The URL exactly as dispatched
    pub url: String,

    /// Category that matched first
    pub category: Category,

    /// Why the URL was flagged
    pub reason: String,
}

impl ClassificationResult {
    /// Create a result carrying the category's standard reason
    pub fn new(url: impl Into<String>, category: Category) -> Self {
        Self {
            url: url.into(),
            category,
            reason: category.reason().to_string(),
        }
    }

    /// Replace the reason text
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }
}

impl fmt::Display for ClassificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}: {}]", self.url, self.category, self.reason)
    }
}

/// Outcome of classifying a single URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Matched an enabled category and no exclusion
    Suspicious(ClassificationResult),
    /// Valid (or unchecked) and matched nothing, or was excluded
    Clean,
    /// Rejected by the validity gate or the length limit
    Invalid,
}

impl Verdict {
    pub fn is_suspicious(&self) -> bool {
        matches!(self, Self::Suspicious(_))
    }
}

/// Aggregate counters for a run
///
/// `suspicious <= processed <= total` holds for every snapshot, and
/// `processed == suspicious + clean`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Lines seen before filtering
    pub total: u64,
    /// URLs that passed the validity gate and were classified
    pub processed: u64,
    /// URLs that matched
    pub suspicious: u64,
    /// URLs that failed validation
    pub invalid: u64,
    /// Blank and comment lines
    pub skipped: u64,
}

impl RunStats {
    /// Processed URLs that did not match
    pub fn clean(&self) -> u64 {
        self.processed.saturating_sub(self.suspicious)
    }

    /// Processed URLs per second, zero when no time has elapsed
    pub fn rate(&self, elapsed: Duration) -> f64 {
        let secs = elapsed.as_secs_f64();
        if secs > 0.0 {
            self.processed as f64 / secs
        } else {
            0.0
        }
    }

    /// Share of processed URLs flagged as suspicious, in percent
    pub fn hit_rate(&self) -> f64 {
        self.suspicious as f64 * 100.0 / self.processed.max(1) as f64
    }
}
