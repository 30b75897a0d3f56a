//! Duplicate suppression by URL

use juicyurls_core::ClassificationResult;
use std::collections::HashSet;

/// URLs already emitted during one run. Grows monotonically.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<String>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `url`, returning `true` the first time it is seen
    pub fn insert(&mut self, url: &str) -> bool {
        if self.seen.contains(url) {
            return false;
        }
        self.seen.insert(url.to_string())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Drop repeated URLs, keeping the first occurrence of each in order
pub fn remove_duplicates(results: Vec<ClassificationResult>) -> Vec<ClassificationResult> {
    let mut dedup = Deduplicator::new();
    results
        .into_iter()
        .filter(|r| dedup.insert(&r.url))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use juicyurls_core::Category;

    fn result(url: &str) -> ClassificationResult {
        ClassificationResult::new(url, Category::Keywords).with_reason("")
    }

    #[test]
    fn test_remove_duplicates_keeps_first_seen_order() {
        let input = vec![result("a"), result("b"), result("a"), result("c")];
        let urls: Vec<_> = remove_duplicates(input)
            .into_iter()
            .map(|r| r.url)
            .collect();
        assert_eq!(urls, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_first_occurrence_wins() {
        let input = vec![
            ClassificationResult::new("a", Category::Paths),
            ClassificationResult::new("a", Category::Hidden),
        ];
        let out = remove_duplicates(input);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].category, Category::Paths);
    }

    #[test]
    fn test_insert() {
        let mut dedup = Deduplicator::new();
        assert!(dedup.is_empty());
        assert!(dedup.insert("x"));
        assert!(!dedup.insert("x"));
        assert_eq!(dedup.len(), 1);
    }
}
