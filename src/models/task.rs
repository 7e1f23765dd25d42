use serde::{Deserialize, Serialize};

use super::failure::FailureRecord;
use super::run::RunResult;
use crate::error::{ErrorKind, TriageError};
use crate::lint::LintReport;

/// Tagged outcome of an orchestrated operation.
///
/// This is the only channel through which the orchestrator reports outward.
pub type TaskResult<T> = Result<T, TaskFailure>;

/// Failure side of a `TaskResult`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskFailure {
    pub kind: ErrorKind,
    /// Log-level detail; never shown verbatim in the human narrative
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub build_errors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<FailureRecord>,
    /// Number of attempts made before giving up
    #[serde(default)]
    pub attempts: u32,
}

impl TaskFailure {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            build_errors: Vec::new(),
            failures: Vec::new(),
            attempts: 0,
        }
    }

    /// Carry the build errors and failures of a run into the failure
    pub fn with_run(mut self, run: &RunResult) -> Self {
        self.build_errors = run.build_errors.clone();
        self.failures = run.failures.clone();
        self.attempts = run.attempt;
        self
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }
}

impl From<TriageError> for TaskFailure {
    fn from(err: TriageError) -> Self {
        TaskFailure::new(err.kind(), format!("{err:#}"))
    }
}

/// Success payload of the task types triage knows about.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum TaskOutput {
    /// A passing test run, or an analyzed bundle
    Tests(RunResult),
    /// A completed lint pass
    Lint(LintReport),
}

impl TaskOutput {
    pub fn run(&self) -> Option<&RunResult> {
        match self {
            TaskOutput::Tests(run) => Some(run),
            TaskOutput::Lint(_) => None,
        }
    }
}

/// Serialize a `TaskResult` as `{ "ok": true, "value": … }` or
/// `{ "ok": false, "kind": …, … }`.
pub fn task_result_to_json<T: Serialize>(result: &TaskResult<T>) -> serde_json::Value {
    match result {
        Ok(value) => serde_json::json!({
            "ok": true,
            "value": value,
        }),
        Err(failure) => {
            let mut json = serde_json::to_value(failure).unwrap_or_default();
            if let Some(map) = json.as_object_mut() {
                map.insert("ok".to_string(), serde_json::Value::Bool(false));
            }
            json
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_failure_from_triage_error() {
        let err = TriageError::ToolMissing {
            tool: "swiftlint".to_string(),
        };
        let failure = TaskFailure::from(err);
        assert_eq!(failure.kind, ErrorKind::SwiftlintNotInstalled);
        assert!(failure.message.contains("swiftlint"));
    }

    #[test]
    fn test_with_run_copies_lists() {
        let run = RunResult::tested(3, vec![FailureRecord::new("a", "b", "c")]);
        let failure = TaskFailure::new(ErrorKind::MaxRetries, "out of attempts").with_run(&run);
        assert_eq!(failure.failures.len(), 1);
        assert_eq!(failure.attempts, 3);
        assert!(failure.build_errors.is_empty());
    }

    #[test]
    fn test_task_result_json_shapes() {
        let ok: TaskResult<u32> = Ok(7);
        let json = task_result_to_json(&ok);
        assert_eq!(json["ok"], true);
        assert_eq!(json["value"], 7);

        let err: TaskResult<u32> = Err(TaskFailure::new(ErrorKind::MissingProject, "gone"));
        let json = task_result_to_json(&err);
        assert_eq!(json["ok"], false);
        assert_eq!(json["kind"], "missing-project");
        assert!(json.get("failures").is_none());
    }
}
