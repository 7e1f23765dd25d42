use anyhow::{Context, Result};
use colored::Colorize;

use crate::report::{FormattedReport, Priority, ReportKind};

/// Print a report: pretty JSON with `--json`, otherwise a status line and the narrative.
pub fn print_report(report: &FormattedReport, json: bool) -> Result<()> {
    if json {
        let rendered = serde_json::to_string_pretty(&report.structured)
            .context("Failed to serialize report")?;
        println!("{rendered}");
        return Ok(());
    }

    println!("{}\n", status_line(report));
    print!("{}", report.text);
    Ok(())
}

fn status_line(report: &FormattedReport) -> String {
    let structured = &report.structured;
    match structured.report_type {
        ReportKind::Success => format!("{} {}", "✓".green().bold(), "success".green()),
        ReportKind::InvalidInput => format!("{} {}", "✗".red().bold(), "invalid request".red()),
        _ => {
            let label = match structured.priority {
                Priority::FixBuild => "fix-build".red().bold(),
                Priority::FixCritical => "fix-critical".red().bold(),
                Priority::FixTests => "fix-tests".yellow().bold(),
                Priority::AllGood => "error".red().bold(),
            };
            format!(
                "{} {label} ({} build errors, {} failures)",
                "✗".red().bold(),
                structured.build_errors.len(),
                structured.summary.total_failures
            )
        }
    }
}
