//! Tests for report formatting

use serde_json::json;

use super::*;
use crate::lint::LintViolation;
use crate::models::{RunResult, Severity, TaskFailure};

fn failure(id: &str, severity: Severity) -> FailureRecord {
    let mut record = FailureRecord::new(id, "Suite", format!("{id} failed"));
    record.severity = severity;
    record
}

fn valid() -> Validation {
    Validation::ok()
}

fn input() -> Value {
    json!({"type": "test", "scheme": "App"})
}

#[test]
fn test_invalid_input_wins() {
    let result: TaskResult<TaskOutput> = Err(TaskFailure::new(ErrorKind::BuildError, "x")
        .with_run(&RunResult::build_failed(1, vec!["error: x".to_string()])));
    let report = format_report(
        &input(),
        &Validation::invalid("test task requires a scheme"),
        Some(&result),
    );

    assert_eq!(report.structured.report_type, ReportKind::InvalidInput);
    assert!(!report.structured.valid);
    assert!(report.text.contains("test task requires a scheme"));
    assert!(report.text.starts_with("# Invalid task request"));
}

#[test]
fn test_needs_context_lists_build_errors_then_failures() {
    let mut task_failure = TaskFailure::new(ErrorKind::NeedsContext, "need more");
    task_failure.build_errors = vec!["error: missing type".to_string()];
    task_failure.failures = vec![failure_record_with_location()];
    let result: TaskResult<TaskOutput> = Err(task_failure);

    let report = format_report(&input(), &valid(), Some(&result));
    assert_eq!(report.structured.report_type, ReportKind::NeedsContext);
    let build_at = report.text.find("## Build errors").unwrap();
    let failures_at = report.text.find("## Failures").unwrap();
    assert!(build_at < failures_at);
    assert!(report.text.contains("LoginTests/testA() (LoginTests.swift:9): boom"));
}

fn failure_record_with_location() -> FailureRecord {
    FailureRecord::new("LoginTests/testA()", "LoginTests", "boom")
        .with_location("LoginTests.swift", Some(9))
}

#[test]
fn test_absent_result_is_execution_error() {
    let report = format_report(&input(), &valid(), None);
    assert_eq!(report.structured.report_type, ReportKind::ExecutionError);
    assert!(!report.structured.ok);
    assert!(!report.structured.next_steps.is_empty());
}

#[test]
fn test_success_is_all_good() {
    let result: TaskResult<TaskOutput> = Ok(TaskOutput::Tests(RunResult::tested(1, vec![])));
    let report = format_report(&input(), &valid(), Some(&result));

    assert_eq!(report.structured.report_type, ReportKind::Success);
    assert_eq!(report.structured.priority, Priority::AllGood);
    assert_eq!(report.structured.summary.total_failures, 0);
    assert!(report.structured.summary.priorities.is_empty());
}

#[test]
fn test_single_critical_failure_summary() {
    let run = RunResult::tested(1, vec![failure("A/testCrash()", Severity::Critical)]);
    let result: TaskResult<TaskOutput> =
        Err(TaskFailure::new(ErrorKind::TestFailures, "1 failing").with_run(&run));
    let report = format_report(&input(), &valid(), Some(&result));

    let json = serde_json::to_value(&report.structured).unwrap();
    assert_eq!(json["summary"]["totalFailures"], 1);
    assert_eq!(json["summary"]["priorities"], json!({"critical": 1}));
    assert_eq!(json["priority"], "fix-critical");
    assert_eq!(json["reportType"], "test-failures");
}

#[test]
fn test_build_errors_take_priority_over_failures() {
    let mut task_failure = TaskFailure::new(ErrorKind::BuildError, "build failed");
    task_failure.build_errors = vec!["undefined symbol X".to_string()];
    task_failure.failures = vec![failure("A/test()", Severity::Critical)];
    let result: TaskResult<TaskOutput> = Err(task_failure);

    let report = format_report(&input(), &valid(), Some(&result));
    assert_eq!(report.structured.report_type, ReportKind::BuildError);
    assert_eq!(report.structured.priority, Priority::FixBuild);
    assert_eq!(report.structured.build_errors.len(), 1);
    assert!(report.text.contains("undefined symbol X"));
}

#[test]
fn test_failures_grouped_by_severity_in_fixed_order() {
    let run = RunResult::tested(
        2,
        vec![
            failure("A/testLow()", Severity::Low),
            failure("A/testCritical()", Severity::Critical),
            failure("B/testMedium()", Severity::Medium),
            failure("B/testHigh()", Severity::High),
            failure("B/testCritical2()", Severity::Critical),
        ],
    );
    let result: TaskResult<TaskOutput> =
        Err(TaskFailure::new(ErrorKind::MaxRetries, "still failing").with_run(&run));
    let report = format_report(&input(), &valid(), Some(&result));

    let order: Vec<usize> = ["## Critical (2)", "## High (1)", "## Medium (1)", "## Low (1)"]
        .iter()
        .map(|heading| report.text.find(heading).unwrap())
        .collect();
    assert!(order.windows(2).all(|pair| pair[0] < pair[1]));
    assert!(report.text.starts_with("# Attempts exhausted"));

    // traversal order kept within a tier and in the structured list
    let first = report.text.find("A/testCritical()").unwrap();
    let second = report.text.find("B/testCritical2()").unwrap();
    assert!(first < second);
    assert_eq!(report.structured.failures[0].identifier, "A/testLow()");
    assert_eq!(report.structured.attempts, 2);
}

#[test]
fn test_named_kind_templates() {
    for (kind, title) in [
        (ErrorKind::MissingProject, "# Project not found"),
        (ErrorKind::MaxRetries, "# Attempts exhausted"),
        (ErrorKind::BuildError, "# Build failed"),
        (ErrorKind::UnknownError, "# Unexpected error"),
        (ErrorKind::SwiftlintNotInstalled, "# SwiftLint not installed"),
        (ErrorKind::UnknownTaskType, "# Unknown task type"),
    ] {
        let result: TaskResult<TaskOutput> =
            Err(TaskFailure::new(kind, "raw tool text /secret/path"));
        let report = format_report(&input(), &valid(), Some(&result));

        assert_eq!(report.structured.report_type, ReportKind::Error);
        assert_eq!(report.structured.kind, Some(kind));
        assert!(report.text.starts_with(title), "{kind}: {}", report.text);
        assert!(report.text.contains("## Next steps"));
        assert!(!report.text.contains("/secret/path"));
    }
}

#[test]
fn test_lint_section() {
    let lint = LintReport {
        violations: vec![LintViolation {
            file: "Login.swift".to_string(),
            line: Some(4),
            column: None,
            severity: "error".to_string(),
            rule_id: "force_cast".to_string(),
            reason: "Force casts should be avoided".to_string(),
        }],
    };
    let result: TaskResult<TaskOutput> = Ok(TaskOutput::Lint(lint));
    let report = format_report(&json!({"type": "lint"}), &valid(), Some(&result));

    assert_eq!(report.structured.report_type, ReportKind::Success);
    assert_eq!(report.structured.priority, Priority::AllGood);
    assert!(report.text.contains("## Lint (1 errors, 0 warnings)"));
    assert!(report.text.contains("- [error] Login.swift:4 force_cast"));
    assert_eq!(report.structured.lint.as_ref().unwrap().violations.len(), 1);
}

#[test]
fn test_input_is_echoed() {
    let report = format_report(&input(), &valid(), None);
    assert_eq!(report.structured.input, input());
}
