//! Machine-readable report record

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::ErrorKind;
use crate::lint::LintReport;
use crate::models::{FailureCategory, FailureRecord, Severity};

/// Which branch of the priority rule produced the report.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    InvalidInput,
    NeedsContext,
    ExecutionError,
    Success,
    BuildError,
    TestFailures,
    Error,
}

/// What a fixer should work on first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    FixBuild,
    FixCritical,
    FixTests,
    AllGood,
}

impl Priority {
    /// Build errors, then any critical failure, then any failure.
    pub fn for_results(build_errors: &[String], failures: &[FailureRecord]) -> Self {
        if !build_errors.is_empty() {
            Priority::FixBuild
        } else if failures.iter().any(|f| f.severity == Severity::Critical) {
            Priority::FixCritical
        } else if !failures.is_empty() {
            Priority::FixTests
        } else {
            Priority::AllGood
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::FixBuild => "fix-build",
            Priority::FixCritical => "fix-critical",
            Priority::FixTests => "fix-tests",
            Priority::AllGood => "all-good",
        }
    }
}

/// Failure counts. Only categories and severities that occur are present.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_failures: usize,
    pub categories: BTreeMap<FailureCategory, usize>,
    pub priorities: BTreeMap<Severity, usize>,
}

impl Summary {
    pub fn from_failures(failures: &[FailureRecord]) -> Self {
        let mut summary = Summary {
            total_failures: failures.len(),
            ..Summary::default()
        };
        for failure in failures {
            *summary.categories.entry(failure.category).or_default() += 1;
            *summary.priorities.entry(failure.severity).or_default() += 1;
        }
        summary
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StructuredReport {
    pub report_type: ReportKind,
    /// The request as it was received
    pub input: Value,
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation_errors: Vec<String>,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    pub priority: Priority,
    pub summary: Summary,
    pub build_errors: Vec<String>,
    pub failures: Vec<FailureRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lint: Option<LintReport>,
    #[serde(default)]
    pub attempts: u32,
    pub next_steps: Vec<String>,
}
