//! Report formatting
//!
//! Turns a task outcome into a structured record plus a markdown narrative. Which report
//! is produced follows a fixed priority:
//!
//! 1. invalid input
//! 2. `needs-context`
//! 3. no result at all
//! 4. success
//! 5. build errors, even when failures are also present
//! 6. failures, grouped by severity
//! 7. the template for the failure kind
//!
//! Raw error messages from the task go to the log, never into the report.

mod structured;
mod templates;
mod text;

#[cfg(test)]
mod tests;

use serde_json::Value;
use tracing::debug;

use crate::error::ErrorKind;
use crate::lint::LintReport;
use crate::models::{FailureRecord, TaskOutput, TaskResult};
use crate::task::Validation;

pub use structured::{Priority, ReportKind, StructuredReport, Summary};
use templates::Template;
use text::Narrative;

/// Both renderings of one task outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedReport {
    pub structured: StructuredReport,
    pub text: String,
}

/// Lists pulled out of either side of a `TaskResult`
struct Outcome<'a> {
    ok: bool,
    kind: Option<ErrorKind>,
    build_errors: &'a [String],
    failures: &'a [FailureRecord],
    lint: Option<&'a LintReport>,
    attempts: u32,
}

impl<'a> Outcome<'a> {
    fn from_result(result: &'a TaskResult<TaskOutput>) -> Self {
        match result {
            Ok(output) => {
                let (build_errors, failures, attempts) = match output.run() {
                    Some(run) => (run.build_errors.as_slice(), run.failures.as_slice(), run.attempt),
                    None => (&[][..], &[][..], 0),
                };
                let lint = match output {
                    TaskOutput::Lint(report) => Some(report),
                    TaskOutput::Tests(_) => None,
                };
                Outcome {
                    ok: true,
                    kind: None,
                    build_errors,
                    failures,
                    lint,
                    attempts,
                }
            }
            Err(failure) => {
                debug!(kind = %failure.kind, message = %failure.message, "formatting failed task");
                Outcome {
                    ok: false,
                    kind: Some(failure.kind),
                    build_errors: &failure.build_errors,
                    failures: &failure.failures,
                    lint: None,
                    attempts: failure.attempts,
                }
            }
        }
    }

    fn empty() -> Self {
        Outcome {
            ok: false,
            kind: None,
            build_errors: &[],
            failures: &[],
            lint: None,
            attempts: 0,
        }
    }
}

/// Render the report for a task outcome.
///
/// `input` is echoed back verbatim in the structured record. `result` is `None` when the
/// task never produced one (it was not run, or its result could not be read).
pub fn format_report(
    input: &Value,
    validation: &Validation,
    result: Option<&TaskResult<TaskOutput>>,
) -> FormattedReport {
    let outcome = result.map_or_else(Outcome::empty, Outcome::from_result);
    let mut narrative = Narrative::default();

    let (report_type, template) = if !validation.valid {
        narrative.heading(&templates::INVALID_INPUT);
        narrative.list("Problems", &validation.errors);
        (ReportKind::InvalidInput, templates::INVALID_INPUT)
    } else if outcome.kind == Some(ErrorKind::NeedsContext) {
        narrative.heading(&templates::NEEDS_CONTEXT);
        narrative.build_errors(outcome.build_errors);
        narrative.failure_list(outcome.failures);
        (ReportKind::NeedsContext, templates::NEEDS_CONTEXT)
    } else if result.is_none() {
        narrative.heading(&templates::EXECUTION_ERROR);
        (ReportKind::ExecutionError, templates::EXECUTION_ERROR)
    } else if outcome.ok && outcome.build_errors.is_empty() && outcome.failures.is_empty() {
        narrative.heading(&templates::SUCCESS);
        (ReportKind::Success, templates::SUCCESS)
    } else if !outcome.build_errors.is_empty() {
        let template = templates::for_kind(ErrorKind::BuildError);
        narrative.heading(&template);
        narrative.build_errors(outcome.build_errors);
        (ReportKind::BuildError, template)
    } else if !outcome.failures.is_empty() {
        let template = templates::for_kind(outcome.kind.unwrap_or(ErrorKind::TestFailures));
        narrative.heading(&template);
        narrative.failures_by_severity(outcome.failures);
        (ReportKind::TestFailures, template)
    } else {
        let template = templates::for_kind(outcome.kind.unwrap_or(ErrorKind::UnknownError));
        narrative.heading(&template);
        (ReportKind::Error, template)
    };

    if let Some(lint) = outcome.lint {
        narrative.lint(lint);
    }
    let next_steps = next_steps(&template, outcome.lint);
    narrative.next_steps(&next_steps);

    let structured = StructuredReport {
        report_type,
        input: input.clone(),
        valid: validation.valid,
        validation_errors: validation.errors.clone(),
        ok: outcome.ok,
        kind: outcome.kind,
        priority: Priority::for_results(outcome.build_errors, outcome.failures),
        summary: Summary::from_failures(outcome.failures),
        build_errors: outcome.build_errors.to_vec(),
        failures: outcome.failures.to_vec(),
        lint: outcome.lint.cloned(),
        attempts: outcome.attempts,
        next_steps,
    };

    FormattedReport {
        structured,
        text: narrative.finish(),
    }
}

fn next_steps(template: &Template, lint: Option<&LintReport>) -> Vec<String> {
    let mut steps: Vec<String> = template.next_steps.iter().map(|s| s.to_string()).collect();
    if lint.is_some_and(|report| report.error_count() > 0) {
        steps.push("Fix lint errors before warnings; warnings do not fail the build".to_string());
    }
    steps
}
