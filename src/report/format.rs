//! Formatted terminal output.
//!
//! Formatting lives here so the generators and the pipeline stay free of
//! presentation concerns.

use chrono::NaiveDate;

use crate::domain::{DeterministicFamily, TimeSeries};
use crate::report::{BatchReport, Outcome};

/// Header, counts, and the list of skipped dates.
pub fn format_batch_summary(report: &BatchReport) -> String {
    let mut out = String::new();

    out.push_str("=== ffam - forecast family batch ===\n");
    out.push_str(&format!("Mode: {:?}\n", report.mode));
    out.push_str(&format!("Variable: {}\n", report.variable));
    if !report.metrics.is_empty() {
        let metrics: Vec<&str> = report.metrics.iter().map(|m| m.as_str()).collect();
        out.push_str(&format!("Metrics: {}\n", metrics.join(", ")));
    }
    let skills: Vec<String> = report.skills.iter().map(|s| s.to_string()).collect();
    out.push_str(&format!("Skills: {}\n", skills.join(", ")));
    out.push_str(&format!("Issue dates: {} .. {}\n", report.begin, report.end));
    out.push_str(&format!(
        "Generated: {} date(s), {} file(s)\n",
        report.generated().count(),
        report.files_written()
    ));

    let skipped: Vec<_> = report.skipped().collect();
    out.push_str(&format!("Skipped: {} date(s)\n", skipped.len()));
    for d in skipped {
        if let Outcome::Skipped { reason } = &d.outcome {
            out.push_str(&format!("  - {}: {}\n", d.issue_date, reason));
        }
    }

    out
}

/// Table of observations, point forecast and each family member.
///
/// Shows at most `max_rows` rows; the rest are summarized on one line.
pub fn format_family_table(observations: &TimeSeries, family: &DeterministicFamily, max_rows: usize) -> String {
    let mut headers = vec!["date".to_string(), "observed".to_string(), "forecast".to_string()];
    headers.extend(family.family.skills().map(|s| s.column_label()));

    let width = headers.iter().map(String::len).max().unwrap_or(8).max(10);
    let mut out = String::new();
    out.push_str(&format!("=== {} family ===\n", family.metric));
    out.push_str(&row_line(&headers, width));

    let n = observations.len();
    for t in 0..n.min(max_rows) {
        let mut cells = vec![
            format_date(observations.index()[t]),
            format!("{:.4}", observations.values()[t]),
            format!("{:.4}", family.forecast.values()[t]),
        ];
        cells.extend(
            family
                .family
                .iter()
                .map(|m| format!("{:.4}", m.forecast.values()[t])),
        );
        out.push_str(&row_line(&cells, width));
    }
    if n > max_rows {
        out.push_str(&format!("... {} more row(s)\n", n - max_rows));
    }

    out
}

fn row_line(cells: &[String], width: usize) -> String {
    let mut line = cells
        .iter()
        .map(|c| format!("{c:>width$}"))
        .collect::<Vec<_>>()
        .join(" ");
    line.push('\n');
    line
}

fn format_date(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}
