//! Task requests and dispatch
//!
//! A task request is the unit of work handed to triage: run tests, lint, or analyze an
//! existing result bundle. Requests are validated up front; the report formatter uses the
//! validation outcome to decide whether a result is even worth rendering.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, info_span};
use uuid::Uuid;

use crate::config::TriageConfig;
use crate::error::{ErrorKind, TriageError};
use crate::lint::{locate_swiftlint, run_lint};
use crate::models::{RunResult, TaskFailure, TaskOutput, TaskResult};
use crate::pipeline::interpret_result_bundle;
use crate::runner::{
    parent_dir, run_with_retries, AttemptOptions, CommandRunner, Orchestrator, Remediator,
};
use crate::tree::ResultStore;

pub const TASK_TEST: &str = "test";
pub const TASK_LINT: &str = "lint";
pub const TASK_ANALYZE: &str = "analyze";

fn new_task_id() -> String {
    Uuid::new_v4().to_string()
}

/// One requested unit of work.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskRequest {
    #[serde(default = "new_task_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub task_type: String,
    /// Project path for `test`/`lint`; root for relative sources in `analyze`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub only_testing: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
    /// Result bundle for `analyze`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle: Option<PathBuf>,
}

impl TaskRequest {
    pub fn new(task_type: impl Into<String>) -> Self {
        Self {
            id: new_task_id(),
            task_type: task_type.into(),
            project: None,
            scheme: None,
            destination: None,
            only_testing: Vec::new(),
            max_attempts: None,
            bundle: None,
        }
    }

    pub fn test(project: impl Into<PathBuf>, scheme: impl Into<String>) -> Self {
        Self {
            project: Some(project.into()),
            scheme: Some(scheme.into()),
            ..Self::new(TASK_TEST)
        }
    }

    pub fn lint(project: impl Into<PathBuf>) -> Self {
        Self {
            project: Some(project.into()),
            ..Self::new(TASK_LINT)
        }
    }

    pub fn analyze(bundle: impl Into<PathBuf>, project_root: Option<PathBuf>) -> Self {
        Self {
            bundle: Some(bundle.into()),
            project: project_root,
            ..Self::new(TASK_ANALYZE)
        }
    }

    /// Check the request is complete enough to run.
    ///
    /// Unknown task types are not a validation error; dispatch reports them as
    /// `unknown-task-type`.
    pub fn validate(&self) -> Validation {
        let mut errors = Vec::new();
        let blank = |value: &Option<String>| value.as_deref().map_or(true, |v| v.trim().is_empty());

        if self.task_type.trim().is_empty() {
            errors.push("task type is required".to_string());
        }
        match self.task_type.as_str() {
            TASK_TEST => {
                if self.project.is_none() {
                    errors.push("test task requires a project".to_string());
                }
                if blank(&self.scheme) {
                    errors.push("test task requires a scheme".to_string());
                }
                if self.max_attempts == Some(0) {
                    errors.push("maxAttempts must be at least 1".to_string());
                }
            }
            TASK_LINT => {
                if self.project.is_none() {
                    errors.push("lint task requires a project".to_string());
                }
            }
            TASK_ANALYZE => {
                if self.bundle.is_none() {
                    errors.push("analyze task requires a bundle".to_string());
                }
            }
            _ => {}
        }

        Validation {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Outcome of [`TaskRequest::validate`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Validation {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl Validation {
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            errors: vec![error.into()],
        }
    }
}

/// Collaborators a task needs, built once and shared by every worker.
pub struct TaskContext {
    pub orchestrator: Arc<Orchestrator>,
    pub runner: Arc<dyn CommandRunner>,
    pub store: Arc<dyn ResultStore>,
    pub remediator: Arc<dyn Remediator>,
    pub config: TriageConfig,
}

impl TaskContext {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        store: Arc<dyn ResultStore>,
        remediator: Arc<dyn Remediator>,
        config: TriageConfig,
    ) -> Self {
        let orchestrator = Arc::new(Orchestrator::new(
            runner.clone(),
            store.clone(),
            config.clone(),
        ));
        Self {
            orchestrator,
            runner,
            store,
            remediator,
            config,
        }
    }
}

/// Run a validated request.
pub fn execute_task(request: &TaskRequest, context: &TaskContext) -> TaskResult<TaskOutput> {
    let span = info_span!("task", id = %request.id, kind = %request.task_type);
    let _guard = span.enter();
    info!("task started");

    let result = match request.task_type.as_str() {
        TASK_TEST => run_test_task(request, context),
        TASK_LINT => run_lint_task(request, context),
        TASK_ANALYZE => run_analyze_task(request, context),
        other => Err(TriageError::UnknownTaskType(other.to_string()).into()),
    };

    match &result {
        Ok(_) => info!("task succeeded"),
        Err(failure) => info!(kind = %failure.kind, "task failed"),
    }
    result
}

fn required<T: Clone>(value: &Option<T>, what: &str) -> TaskResult<T> {
    value
        .clone()
        .ok_or_else(|| TaskFailure::new(ErrorKind::UnknownError, format!("{what} is required")))
}

fn run_test_task(request: &TaskRequest, context: &TaskContext) -> TaskResult<TaskOutput> {
    let mut options = AttemptOptions::new(
        required(&request.project, "project")?,
        required(&request.scheme, "scheme")?,
    );
    options.destination = request.destination.clone();
    options.only_testing = request.only_testing.clone();

    let max_attempts = request.max_attempts.unwrap_or(context.config.max_attempts);
    run_with_retries(
        &context.orchestrator,
        &options,
        max_attempts,
        context.remediator.as_ref(),
    )
    .map(TaskOutput::Tests)
}

fn run_lint_task(request: &TaskRequest, context: &TaskContext) -> TaskResult<TaskOutput> {
    let project = required(&request.project, "project")?;
    let swiftlint = locate_swiftlint(context.config.swiftlint_path.as_deref())?;
    let report = run_lint(
        context.runner.as_ref(),
        &swiftlint,
        &project,
        context.config.command_timeout(),
    )?;
    Ok(TaskOutput::Lint(report))
}

fn run_analyze_task(request: &TaskRequest, context: &TaskContext) -> TaskResult<TaskOutput> {
    let bundle = required(&request.bundle, "bundle")?;
    if !bundle.exists() {
        return Err(TriageError::MissingProject { path: bundle }.into());
    }
    let project_root = request
        .project
        .clone()
        .unwrap_or_else(|| parent_dir(&bundle).to_path_buf());

    let failures = interpret_result_bundle(context.store.as_ref(), &bundle, &project_root);
    let run = RunResult::tested(1, failures);
    if run.passed() {
        return Ok(TaskOutput::Tests(run));
    }
    Err(TaskFailure::new(
        ErrorKind::TestFailures,
        format!("{} test(s) failed in {}", run.failures.len(), bundle.display()),
    )
    .with_run(&run))
}
