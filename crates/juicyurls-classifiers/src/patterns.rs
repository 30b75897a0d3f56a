//! Pattern-based URL matching
//!
//! Every pattern list is compiled once, in [`PatternMatcher::new`]. The
//! returned matcher is immutable and shared read-only by all workers.
//!
//! Substring categories (keywords, paths, hidden) each compile to a single
//! Aho-Corasick automaton, or to a case-insensitive regex alternation when a
//! pattern is not pure ASCII. Extensions compile to one anchored regex
//! alternation. Exclusions are literal substrings, or regexes when written
//! as `re:<pattern>`.

use crate::suspicious;
use aho_corasick::AhoCorasick;
use juicyurls_core::{Category, CategorySet, Error, Result};
use regex::{Regex, RegexBuilder};
use tracing::{debug, warn};

/// Prefix marking an exclusion entry as a regular expression
pub const REGEX_PREFIX: &str = "re:";

/// Raw pattern lists for every category
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    pub keywords: Vec<String>,
    pub extensions: Vec<String>,
    pub paths: Vec<String>,
    pub hidden: Vec<String>,
}

impl PatternSet {
    /// The built-in tables
    pub fn builtin() -> Self {
        let owned = |table: &[&str]| table.iter().map(|s| s.to_string()).collect();
        Self {
            keywords: owned(suspicious::KEYWORDS),
            extensions: owned(suspicious::EXTENSIONS),
            paths: owned(suspicious::PATHS),
            hidden: owned(suspicious::HIDDEN),
        }
    }

    pub fn get(&self, category: Category) -> &[String] {
        match category {
            Category::Keywords => &self.keywords,
            Category::Extensions => &self.extensions,
            Category::Paths => &self.paths,
            Category::Hidden => &self.hidden,
        }
    }

    pub fn set(&mut self, category: Category, patterns: Vec<String>) {
        match category {
            Category::Keywords => self.keywords = patterns,
            Category::Extensions => self.extensions = patterns,
            Category::Paths => self.paths = patterns,
            Category::Hidden => self.hidden = patterns,
        }
    }

    /// Builder-style [`set`](Self::set)
    pub fn with<I, S>(mut self, category: Category, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set(category, patterns.into_iter().map(Into::into).collect());
        self
    }
}

enum Detector {
    Substring(AhoCorasick),
    Regex(Regex),
}

impl Detector {
    fn is_match(&self, url: &str) -> bool {
        match self {
            Self::Substring(ac) => ac.is_match(url),
            Self::Regex(re) => re.is_match(url),
        }
    }
}

/// Compiled category and exclusion patterns
pub struct PatternMatcher {
    exclude_literals: Option<Detector>,
    exclude_regexes: Vec<Regex>,
    detectors: Vec<(Category, Detector)>,
    skipped: usize,
}

impl PatternMatcher {
    /// Compile the enabled categories of `patterns` plus `exclusions`
    ///
    /// A single unusable pattern (blank, or a malformed `re:` exclusion) is
    /// skipped with a warning. Failing to build a whole automaton is a
    /// configuration error.
    pub fn new(patterns: &PatternSet, enabled: CategorySet, exclusions: &[String]) -> Result<Self> {
        let mut skipped = 0;

        let mut literals = Vec::new();
        let mut exclude_regexes = Vec::new();
        for raw in exclusions {
            let pattern = raw.trim();
            if pattern.is_empty() {
                continue;
            }

            match pattern.strip_prefix(REGEX_PREFIX) {
                Some(expr) => match RegexBuilder::new(expr).case_insensitive(true).build() {
                    Ok(re) => exclude_regexes.push(re),
                    Err(e) => {
                        warn!(pattern = %pattern, "Skipping malformed exclusion regex: {}", e);
                        skipped += 1;
                    }
                },
                None => literals.push(pattern),
            }
        }

        let exclude_literals = if literals.is_empty() {
            None
        } else {
            Some(substring_detector(&literals)?)
        };

        let mut detectors = Vec::new();
        for category in enabled.iter() {
            let (usable, dropped) = usable_patterns(category, patterns.get(category));
            skipped += dropped;

            if usable.is_empty() {
                debug!(category = %category, "Category enabled with no patterns");
                continue;
            }

            let detector = match category {
                Category::Extensions => Detector::Regex(suffix_regex(&usable)?),
                _ => substring_detector(&usable)?,
            };
            debug!(category = %category, patterns = usable.len(), "Compiled category");
            detectors.push((category, detector));
        }

        Ok(Self {
            exclude_literals,
            exclude_regexes,
            detectors,
            skipped,
        })
    }

    /// Whether any exclusion pattern matches
    pub fn is_excluded(&self, url: &str) -> bool {
        if let Some(literals) = &self.exclude_literals {
            if literals.is_match(url) {
                return true;
            }
        }
        self.exclude_regexes.iter().any(|re| re.is_match(url))
    }

    /// First matching category in precedence order, or `None` when the URL
    /// is excluded or matches nothing
    pub fn classify(&self, url: &str) -> Option<Category> {
        if url.is_empty() || self.is_excluded(url) {
            return None;
        }

        self.detectors
            .iter()
            .find(|(_, detector)| detector.is_match(url))
            .map(|(category, _)| *category)
    }

    /// Categories that have at least one compiled pattern
    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.detectors.iter().map(|(category, _)| *category)
    }

    /// Patterns dropped during compilation
    pub fn skipped_patterns(&self) -> usize {
        self.skipped
    }
}

fn usable_patterns(category: Category, patterns: &[String]) -> (Vec<&str>, usize) {
    let mut dropped = 0;
    let usable = patterns
        .iter()
        .filter_map(|p| {
            let p = p.trim();
            if p.is_empty() {
                warn!(category = %category, "Skipping blank pattern");
                dropped += 1;
                None
            } else {
                Some(p)
            }
        })
        .collect();
    (usable, dropped)
}

/// Aho-Corasick folds ASCII case only, so any non-ASCII pattern moves the
/// whole list to a Unicode case-insensitive regex
fn substring_detector(patterns: &[&str]) -> Result<Detector> {
    if patterns.iter().all(|p| p.is_ascii()) {
        return AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(patterns)
            .map(Detector::Substring)
            .map_err(|e| Error::config(format!("Failed to build pattern matcher: {}", e)));
    }

    let alternation = patterns
        .iter()
        .map(|p| regex::escape(p))
        .collect::<Vec<_>>()
        .join("|");
    RegexBuilder::new(&alternation)
        .case_insensitive(true)
        .build()
        .map(Detector::Regex)
        .map_err(|e| Error::config(format!("Failed to build pattern matcher: {}", e)))
}

fn suffix_regex(extensions: &[&str]) -> Result<Regex> {
    let alternation = extensions
        .iter()
        .map(|ext| regex::escape(ext))
        .collect::<Vec<_>>()
        .join("|");

    RegexBuilder::new(&format!("(?:{})$", alternation))
        .case_insensitive(true)
        .build()
        .map_err(|e| Error::config(format!("Failed to build extension matcher: {}", e)))
}
