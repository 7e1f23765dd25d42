//! `triage batch`: run many task requests on the worker pool

use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use super::{load_config, print_report, run_request, shell_context, GlobalOptions};
use crate::report::{format_report, FormattedReport};
use crate::runner::WorkerPool;
use crate::task::{TaskContext, TaskRequest, Validation};

/// Read a JSON array of requests from `path`.
pub fn read_requests(path: &Path) -> Result<Vec<Value>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read requests: {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse requests: {}", path.display()))?;
    match value {
        Value::Array(items) => Ok(items),
        single @ Value::Object(_) => Ok(vec![single]),
        _ => anyhow::bail!("Expected a JSON array of task requests in {}", path.display()),
    }
}

/// Run every request, `pool.size()` at a time. Reports come back in input order.
pub fn run_batch(inputs: Vec<Value>, context: Arc<TaskContext>, pool: &WorkerPool) -> Vec<FormattedReport> {
    let jobs: Vec<_> = inputs
        .into_iter()
        .map(|input| {
            let context = Arc::clone(&context);
            move || match serde_json::from_value::<TaskRequest>(input.clone()) {
                Ok(request) => run_request(&request, &context),
                Err(e) => format_report(
                    &input,
                    &Validation::invalid(format!("malformed request: {e}")),
                    None,
                ),
            }
        })
        .collect();

    let count = jobs.len();
    let reports: Vec<FormattedReport> = pool
        .run_all(jobs)
        .into_iter()
        .map(|report| report.unwrap_or_else(|| format_report(&Value::Null, &Validation::ok(), None)))
        .collect();
    info!(requests = count, workers = pool.size(), "batch finished");
    reports
}

/// Execute the batch command
pub fn execute(requests: &Path, concurrency: Option<usize>, options: &GlobalOptions) -> Result<bool> {
    let mut config = load_config(options.config.as_deref(), None)?;
    if let Some(concurrency) = concurrency {
        config.concurrency = concurrency.max(1);
    }
    let inputs = read_requests(requests)?;
    let pool = WorkerPool::new(config.concurrency);
    let context = Arc::new(shell_context(config, options.no_retry));

    let reports = run_batch(inputs, context, &pool);
    let all_ok = reports.iter().all(|report| report.structured.ok);

    if options.json {
        let structured: Vec<_> = reports.iter().map(|r| &r.structured).collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&structured).context("Failed to serialize reports")?
        );
        return Ok(all_ok);
    }

    for (index, report) in reports.iter().enumerate() {
        if index > 0 {
            println!("\n{}\n", "─".repeat(60).dimmed());
        }
        print_report(report, false)?;
    }
    Ok(all_ok)
}
