//! JuicyURLs
//!
//! Classifies a large list of URLs, one per line, into suspicious and clean
//! by keyword, extension, path and hidden-file patterns.
//!
//! Results go to stdout or a file; logs and the run summary go to stderr.

use anyhow::{Context, Result};
use clap::Parser;
use juicyurls_classifiers::{
    open_input, LineReader, OutputFormat, ResultSink, RunReport, RunStatus, Scanner, WriterSink,
    MAX_FILE_SIZE,
};
use tokio::fs::File;
use tokio::io::BufReader;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

mod cli;
mod config;
mod summary;

pub use cli::Cli;
use config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.verbose);
    juicyurls_telemetry::metrics::describe_metrics();

    // Load configuration
    let settings = Settings::load(&cli)?;
    let scanner = Scanner::from_config(&settings.classifier, settings.scan.clone())
        .context("Invalid configuration")?;

    // Validate and open the input before any work starts
    let (reader, size) = open_input(&cli.list, MAX_FILE_SIZE, settings.scan.max_line_bytes)
        .await
        .with_context(|| format!("Cannot use input list {}", cli.list.display()))?;
    info!(path = %cli.list.display(), bytes = size, "Input opened");

    let abort = CancellationToken::new();
    let on_signal = abort.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        warn!("Shutdown signal received, stopping scan...");
        on_signal.cancel();
    });

    let format = if cli.verbose {
        OutputFormat::Verbose
    } else {
        OutputFormat::Terse
    };

    let report = match &cli.output {
        Some(path) => {
            let mut sink = WriterSink::create(path, format)
                .await
                .with_context(|| format!("Cannot write results to {}", path.display()))?;
            scan(&scanner, reader, size, &mut sink, &abort).await?
        }
        None => {
            let mut sink = WriterSink::stdout(format);
            scan(&scanner, reader, size, &mut sink, &abort).await?
        }
    };

    match report.status {
        RunStatus::Completed => {}
        RunStatus::TimedOut => warn!(
            processed = report.stats.processed,
            total = report.stats.total,
            "Scan timed out, results are partial"
        ),
        RunStatus::Aborted => warn!("Scan aborted, results are partial"),
    }

    if cli.verbose {
        if report.emitted == 0 && cli.output.is_none() {
            info!("No suspicious URLs found.");
        }
        summary::print(&report);
    }

    Ok(())
}

async fn scan(
    scanner: &Scanner,
    reader: LineReader<BufReader<File>>,
    size: u64,
    sink: &mut dyn ResultSink,
    abort: &CancellationToken,
) -> Result<RunReport> {
    scanner
        .run(reader, Some(size), sink, abort)
        .await
        .context("Scan failed")
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Initialize tracing/logging on stderr
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("juicyurls=debug")
        } else {
            EnvFilter::new("juicyurls=info")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
