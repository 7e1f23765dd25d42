//! CLI command implementations
//!
//! Each command builds a task request, runs it, and prints the formatted report. They
//! return whether the task succeeded so the binary can set its exit code.

pub mod analyze;
pub mod batch;
pub mod context;
pub mod lint;
pub mod test;

mod output;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::TriageConfig;
use crate::report::{format_report, FormattedReport};
use crate::runner::{parent_dir, AlwaysRetry, NoRetry, Remediator, ShellRunner};
use crate::task::{execute_task, TaskContext, TaskRequest};
use crate::tree::AutoStore;

pub use output::print_report;

/// Options every command accepts.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub config: Option<PathBuf>,
    pub json: bool,
    pub no_retry: bool,
}

/// Load the config from `--config`, else from next to the project, else from the
/// current directory.
pub fn load_config(explicit: Option<&Path>, project: Option<&Path>) -> Result<TriageConfig> {
    if let Some(path) = explicit {
        return TriageConfig::load(path);
    }
    let dir = match project {
        Some(path) if path.is_dir() && path.extension().is_none() => path.to_path_buf(),
        Some(path) => parent_dir(path).to_path_buf(),
        None => PathBuf::from("."),
    };
    TriageConfig::load_from_dir(&dir)
}

/// Collaborators backed by the real tools.
pub fn shell_context(config: TriageConfig, no_retry: bool) -> TaskContext {
    let remediator: Arc<dyn Remediator> = if no_retry {
        Arc::new(NoRetry)
    } else {
        Arc::new(AlwaysRetry)
    };
    let runner = Arc::new(ShellRunner);
    TaskContext::new(
        runner.clone(),
        Arc::new(AutoStore::new(runner)),
        remediator,
        config,
    )
}

/// Validate, run if valid, and format.
pub fn run_request(request: &TaskRequest, context: &TaskContext) -> FormattedReport {
    let input = serde_json::to_value(request).unwrap_or_default();
    let validation = request.validate();
    let result = validation
        .valid
        .then(|| execute_task(request, context));
    format_report(&input, &validation, result.as_ref())
}

/// Run a single request and print its report.
pub fn run_single(request: TaskRequest, config: TriageConfig, options: &GlobalOptions) -> Result<bool> {
    let context = shell_context(config, options.no_retry);
    let report = run_request(&request, &context);
    print_report(&report, options.json)?;
    Ok(report.structured.ok)
}
