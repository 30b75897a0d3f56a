//! End-of-run summary for verbose mode

use juicyurls_classifiers::{RunReport, RunStatus};

pub fn render(report: &RunReport) -> String {
    let stats = &report.stats;
    let status = match report.status {
        RunStatus::Completed => "completed",
        RunStatus::TimedOut => "timed out (partial results)",
        RunStatus::Aborted => "aborted (partial results)",
    };

    format!(
        "\nScan {}\n\
         Total lines:      {}\n\
         Processed:        {}\n\
         Suspicious:       {} ({:.2}%)\n\
         Invalid:          {}\n\
         Skipped:          {}\n\
         Unique results:   {}\n\
         Duration:         {:.2?}\n\
         Rate:             {:.0} URLs/sec",
        status,
        stats.total,
        stats.processed,
        stats.suspicious,
        stats.hit_rate(),
        stats.invalid,
        stats.skipped,
        report.emitted,
        report.elapsed,
        report.rate(),
    )
}

/// Print the summary to stderr so stdout carries only results
pub fn print(report: &RunReport) {
    eprintln!("{}", render(report));
}
