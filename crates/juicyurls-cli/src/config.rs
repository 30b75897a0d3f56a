//! Configuration management

use anyhow::Context;
use juicyurls_classifiers::{parse_list, ClassifierConfig, ScanConfig};
use serde::{Deserialize, Serialize};

/// Everything a run needs besides the input and output paths
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub classifier: ClassifierConfig,

    #[serde(default)]
    pub scan: ScanConfig,
}

impl Settings {
    /// Load configuration from file and CLI overrides
    pub fn load(cli: &crate::Cli) -> anyhow::Result<Self> {
        // Try to load from file, or use defaults
        let mut settings: Self = if cli.config.exists() {
            let content = std::fs::read_to_string(&cli.config)
                .with_context(|| format!("Failed to read {}", cli.config.display()))?;
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse {}", cli.config.display()))?
        } else {
            Self::default()
        };

        // Apply CLI overrides
        if let Some(categories) = &cli.categories {
            settings.classifier.categories = parse_list(categories);
        }

        if let Some(exclude) = &cli.exclude {
            settings.classifier.excludes = parse_list(exclude);
        }

        if cli.validate {
            settings.classifier.validate_urls = true;
        }

        if let Some(workers) = cli.workers {
            settings.scan.workers = workers;
        }

        if let Some(timeout) = cli.timeout {
            settings.scan.timeout_ms = timeout.as_millis() as u64;
        }

        if let Some(chunk_size) = cli.chunk_size {
            settings.scan.chunk_size = chunk_size;
        }

        if let Some(order) = cli.order {
            settings.scan.order = order;
        }

        if cli.verbose {
            settings.scan.progress = true;
        }

        Ok(settings)
    }
}
