use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::failure::FailureRecord;

/// Terminal state of one build+test attempt.
///
/// System errors never show up here; they travel as `TriageError` and become a
/// `TaskFailure` at the orchestrator boundary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum AttemptOutcome {
    Passed,
    BuildFailed,
    TestsFailed,
}

/// Where an attempt wrote its raw output.
///
/// The attempt directory is removed once the attempt completes, so these paths are a
/// record of what was produced rather than something to reopen later.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RunArtifacts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_bundle: Option<PathBuf>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub logs: Vec<PathBuf>,
}

/// Outcome of one execution attempt.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    /// 1-based attempt number within the orchestrated task
    pub attempt: u32,
    /// Raw build-failure blocks; non-empty means no test ran
    pub build_errors: Vec<String>,
    /// Failed tests in result-tree traversal order
    pub failures: Vec<FailureRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<RunArtifacts>,
}

impl RunResult {
    /// A run that stopped at the build phase
    pub fn build_failed(attempt: u32, build_errors: Vec<String>) -> Self {
        Self {
            attempt,
            build_errors,
            ..Self::default()
        }
    }

    /// A run that reached the test phase
    pub fn tested(attempt: u32, failures: Vec<FailureRecord>) -> Self {
        Self {
            attempt,
            failures,
            ..Self::default()
        }
    }

    pub fn outcome(&self) -> AttemptOutcome {
        if !self.build_errors.is_empty() {
            AttemptOutcome::BuildFailed
        } else if !self.failures.is_empty() {
            AttemptOutcome::TestsFailed
        } else {
            AttemptOutcome::Passed
        }
    }

    pub fn passed(&self) -> bool {
        self.outcome() == AttemptOutcome::Passed
    }
}
