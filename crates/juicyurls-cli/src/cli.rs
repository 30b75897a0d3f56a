//! Command-line interface

use clap::Parser;
use juicyurls_classifiers::OutputOrder;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "juicyurls")]
#[command(version)]
#[command(about = "Find the juicy URLs in a large URL list", long_about = None)]
pub struct Cli {
    /// File with one URL per line
    #[arg(short = 'l', long, env = "JUICYURLS_LIST")]
    pub list: PathBuf,

    /// Categories to enable, comma-separated (keywords, extensions, paths, hidden)
    #[arg(short = 'm', long)]
    pub categories: Option<String>,

    /// Write results to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Exclusion patterns, comma-separated. Prefix an entry with `re:` for a regex
    #[arg(short, long)]
    pub exclude: Option<String>,

    /// Number of workers (0 = number of CPUs)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Run timeout such as 300s, 5m or 250ms (0 disables it)
    #[arg(short, long, value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// Show categories, progress and a summary
    #[arg(short, long)]
    pub verbose: bool,

    /// Reject syntactically invalid URLs before matching
    #[arg(long)]
    pub validate: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "juicyurls.yaml")]
    pub config: PathBuf,

    /// Lines per chunk for large inputs
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Result order: sorted or arrival
    #[arg(long)]
    pub order: Option<OutputOrder>,
}

/// Parse `250ms`, `30s`, `5m`, `1h`, or a bare number of seconds
pub fn parse_duration(raw: &str) -> Result<Duration, String> {
    let raw = raw.trim();
    let split = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    let (digits, unit) = raw.split_at(split);

    let value: u64 = digits
        .parse()
        .map_err(|_| format!("invalid duration '{}'", raw))?;

    let duration = match unit {
        "" | "s" => Duration::from_secs(value),
        "ms" => Duration::from_millis(value),
        "m" => Duration::from_secs(value.saturating_mul(60)),
        "h" => Duration::from_secs(value.saturating_mul(3600)),
        other => {
            return Err(format!(
                "invalid duration unit '{}' (expected ms, s, m or h)",
                other
            ))
        }
    };
    Ok(duration)
}
