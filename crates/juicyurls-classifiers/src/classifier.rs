//! Classifier trait and the URL classifier

use crate::config::ClassifierConfig;
use crate::patterns::{PatternMatcher, PatternSet};
use crate::validation::{is_valid_url, DEFAULT_MAX_URL_LENGTH};
use async_trait::async_trait;
use juicyurls_core::{CategorySet, ClassificationResult, Result, Verdict};
use tracing::info;

/// Trait for all URL classifiers
///
/// Implementations are shared by every worker and must be stateless per
/// call.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify a single URL
    async fn classify(&self, url: &str) -> Verdict;

    /// Get the classifier name
    fn name(&self) -> &str;
}

/// Pattern classifier with an optional validity gate
pub struct UrlClassifier {
    matcher: PatternMatcher,
    validate: bool,
    max_url_length: usize,
}

impl UrlClassifier {
    /// Build the classifier described by `config`
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        let enabled = config.enabled_categories()?;
        let matcher = PatternMatcher::new(&config.pattern_set(), enabled, &config.excludes)?;

        info!(
            categories = ?matcher.categories().collect::<Vec<_>>(),
            exclusions = config.excludes.len(),
            validate = config.validate_urls,
            "URL classifier ready"
        );

        Ok(Self::from_matcher(matcher, config.validate_urls, config.max_url_length))
    }

    /// Build a classifier over explicit pattern lists
    pub fn with_patterns(
        patterns: &PatternSet,
        enabled: CategorySet,
        exclusions: &[String],
        validate: bool,
    ) -> Result<Self> {
        let matcher = PatternMatcher::new(patterns, enabled, exclusions)?;
        Ok(Self::from_matcher(matcher, validate, DEFAULT_MAX_URL_LENGTH))
    }

    pub fn from_matcher(matcher: PatternMatcher, validate: bool, max_url_length: usize) -> Self {
        Self {
            matcher,
            validate,
            max_url_length,
        }
    }

    /// Synchronous classification
    ///
    /// Overlong URLs are invalid whether or not validation is enabled. When
    /// validation is enabled and fails, the matcher is never consulted.
    pub fn classify_url(&self, url: &str) -> Verdict {
        if url.len() > self.max_url_length {
            return Verdict::Invalid;
        }

        if self.validate && !is_valid_url(url, self.max_url_length) {
            return Verdict::Invalid;
        }

        match self.matcher.classify(url) {
            Some(category) => Verdict::Suspicious(ClassificationResult::new(url, category)),
            None => Verdict::Clean,
        }
    }

    pub fn matcher(&self) -> &PatternMatcher {
        &self.matcher
    }
}

#[async_trait]
impl Classifier for UrlClassifier {
    async fn classify(&self, url: &str) -> Verdict {
        self.classify_url(url)
    }

    fn name(&self) -> &str {
        "url_classifier"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use juicyurls_core::Category;

    fn classifier(validate: bool) -> UrlClassifier {
        let patterns = PatternSet::default()
            .with(Category::Extensions, [".exe"])
            .with(Category::Paths, ["/evil"]);
        let enabled = CategorySet::parse(&["extensions", "paths"]).unwrap();
        UrlClassifier::with_patterns(&patterns, enabled, &[], validate).unwrap()
    }

    #[tokio::test]
    async fn test_verdicts() {
        let classifier = classifier(true);

        assert_eq!(classifier.classify("http://clean.com").await, Verdict::Clean);
        assert_eq!(classifier.classify("://invalid-url").await, Verdict::Invalid);

        match classifier.classify("http://bad.com/evil.exe").await {
            Verdict::Suspicious(result) => {
                assert_eq!(result.url, "http://bad.com/evil.exe");
                assert_eq!(result.category, Category::Extensions);
                assert_eq!(result.reason, "Suspicious file extension");
            }
            other => panic!("expected suspicious, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_urls_skip_matching_only_when_validating() {
        assert_eq!(classifier(true).classify_url("justtext/evil"), Verdict::Invalid);
        assert!(classifier(false).classify_url("justtext/evil").is_suspicious());
    }

    #[test]
    fn test_overlong_url_rejected_without_validation() {
        let url = format!("http://x.com/evil{}", "a".repeat(DEFAULT_MAX_URL_LENGTH));
        assert_eq!(classifier(false).classify_url(&url), Verdict::Invalid);
    }

    #[test]
    fn test_from_config_uses_builtin_tables() {
        let config = ClassifierConfig::default().with_excludes("example.org");
        let classifier = UrlClassifier::new(&config).unwrap();

        assert!(classifier.classify_url("https://example.com/.git/HEAD").is_suspicious());
        assert_eq!(
            classifier.classify_url("https://example.org/.git/HEAD"),
            Verdict::Clean
        );
    }
}
