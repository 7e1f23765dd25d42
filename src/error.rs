//! Error taxonomy for triage tasks
//!
//! `TriageError` is what the internals raise. `ErrorKind` is the closed set of outcomes a
//! caller ever sees in a `TaskFailure`. The bridge between the two is
//! [`classify_error_message`], a best-effort heuristic over error text: most of that text
//! comes from external tools, so substring matching is the only signal available.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Closed set of failure kinds surfaced through `TaskResult`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// Compilation failed before any test ran
    BuildError,
    /// Tests ran and some failed; the caller chose not to retry
    TestFailures,
    /// Project file or directory could not be found
    MissingProject,
    /// Attempt budget exhausted while tests were still failing
    MaxRetries,
    /// A remediator asked for more context before continuing
    NeedsContext,
    /// The lint tool is not available on this machine
    SwiftlintNotInstalled,
    /// An external tool ran but its output could not be used
    ToolExecutionFailed,
    /// Anything the heuristic could not place
    UnknownError,
    /// The task request named a task type we do not handle
    UnknownTaskType,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::BuildError => "build-error",
            ErrorKind::TestFailures => "test-failures",
            ErrorKind::MissingProject => "missing-project",
            ErrorKind::MaxRetries => "max-retries",
            ErrorKind::NeedsContext => "needs-context",
            ErrorKind::SwiftlintNotInstalled => "swiftlint-not-installed",
            ErrorKind::ToolExecutionFailed => "tool-execution-failed",
            ErrorKind::UnknownError => "unknown-error",
            ErrorKind::UnknownTaskType => "unknown-task-type",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised inside the pipeline before they are folded into an `ErrorKind`.
#[derive(Debug, Error)]
pub enum TriageError {
    #[error("project not found: {}", path.display())]
    MissingProject { path: PathBuf },

    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` timed out after {}s", timeout.as_secs())]
    Timeout { command: String, timeout: Duration },

    #[error("{tool} is not installed")]
    ToolMissing { tool: String },

    #[error("{tool} execution failed: {message}")]
    ToolFailed { tool: String, message: String },

    #[error("unknown task type: {0}")]
    UnknownTaskType(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TriageError {
    /// Map this error onto the outward taxonomy.
    ///
    /// Variants whose kind is known structurally short-circuit; everything else goes
    /// through the text heuristic.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TriageError::MissingProject { .. } => ErrorKind::MissingProject,
            TriageError::UnknownTaskType(_) => ErrorKind::UnknownTaskType,
            TriageError::ToolMissing { .. } => ErrorKind::SwiftlintNotInstalled,
            TriageError::ToolFailed { .. } => ErrorKind::ToolExecutionFailed,
            _ => classify_error_message(&self.to_string()),
        }
    }
}

/// Classify free-form error text into an `ErrorKind`.
///
/// Best-effort heuristic, not authoritative. Markers are checked in a fixed order and the
/// first hit wins.
pub fn classify_error_message(message: &str) -> ErrorKind {
    let lower = message.to_lowercase();

    if lower.contains("swiftlint")
        && (lower.contains("not installed") || lower.contains("not found"))
    {
        return ErrorKind::SwiftlintNotInstalled;
    }

    if lower.contains("not found") || lower.contains("missing") || lower.contains("does not exist")
    {
        return ErrorKind::MissingProject;
    }

    if lower.contains("build") || lower.contains("xcodebuild") {
        return ErrorKind::BuildError;
    }

    if lower.contains("swiftlint") || lower.contains("execution failed") {
        return ErrorKind::ToolExecutionFailed;
    }

    ErrorKind::UnknownError
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_error_message() {
        assert_eq!(
            classify_error_message("Project file not found at /tmp/App.xcodeproj"),
            ErrorKind::MissingProject
        );
        assert_eq!(
            classify_error_message("workspace is missing"),
            ErrorKind::MissingProject
        );
        assert_eq!(
            classify_error_message("xcodebuild exited with signal 9"),
            ErrorKind::BuildError
        );
        assert_eq!(
            classify_error_message("swiftlint is not installed"),
            ErrorKind::SwiftlintNotInstalled
        );
        assert_eq!(
            classify_error_message("swiftlint returned garbage"),
            ErrorKind::ToolExecutionFailed
        );
        assert_eq!(
            classify_error_message("something odd happened"),
            ErrorKind::UnknownError
        );
        assert_eq!(classify_error_message(""), ErrorKind::UnknownError);
    }

    #[test]
    fn test_classify_error_message_case_insensitive() {
        assert_eq!(
            classify_error_message("BUILD INTERRUPTED"),
            ErrorKind::BuildError
        );
        assert_eq!(
            classify_error_message("SwiftLint NOT FOUND in PATH"),
            ErrorKind::SwiftlintNotInstalled
        );
    }

    #[test]
    fn test_error_kind_structural_variants() {
        let missing = TriageError::MissingProject {
            path: PathBuf::from("/nope/App.xcodeproj"),
        };
        assert_eq!(missing.kind(), ErrorKind::MissingProject);

        let unknown = TriageError::UnknownTaskType("deploy".to_string());
        assert_eq!(unknown.kind(), ErrorKind::UnknownTaskType);

        let tool = TriageError::ToolMissing {
            tool: "swiftlint".to_string(),
        };
        assert_eq!(tool.kind(), ErrorKind::SwiftlintNotInstalled);
    }

    #[test]
    fn test_tool_failure_ignores_stderr_wording() {
        for stderr in [
            "Could not read configuration: file not found",
            "missing rule identifier",
            "build directory is read-only",
        ] {
            let err = TriageError::ToolFailed {
                tool: "swiftlint".to_string(),
                message: format!("exit Some(1): {stderr}"),
            };
            assert_eq!(err.kind(), ErrorKind::ToolExecutionFailed, "{stderr}");
        }
    }

    #[test]
    fn test_timeout_maps_through_heuristic() {
        let err = TriageError::Timeout {
            command: "xcodebuild test".to_string(),
            timeout: Duration::from_secs(5),
        };
        assert_eq!(err.kind(), ErrorKind::BuildError);
    }

    #[test]
    fn test_error_kind_serializes_kebab_case() {
        let json = serde_json::to_string(&ErrorKind::SwiftlintNotInstalled).unwrap();
        assert_eq!(json, "\"swiftlint-not-installed\"");
        assert_eq!(ErrorKind::MaxRetries.to_string(), "max-retries");
    }
}
