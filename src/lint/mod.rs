//! Static analysis through SwiftLint's JSON reporter

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::TriageError;
use crate::runner::{parent_dir, CommandRunner};

const SWIFTLINT: &str = "swiftlint";

/// Exit code SwiftLint uses when it found serious violations
const VIOLATIONS_EXIT_CODE: i32 = 2;

/// One rule violation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LintViolation {
    pub file: String,
    pub line: Option<u32>,
    pub column: Option<u32>,
    /// `error` or `warning`
    pub severity: String,
    pub rule_id: String,
    pub reason: String,
}

impl LintViolation {
    pub fn is_error(&self) -> bool {
        self.severity.eq_ignore_ascii_case("error")
    }
}

/// Result of a completed lint pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LintReport {
    pub violations: Vec<LintViolation>,
}

impl LintReport {
    pub fn error_count(&self) -> usize {
        self.violations.iter().filter(|v| v.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.violations.len() - self.error_count()
    }

    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Shape of one entry in `swiftlint lint --reporter json`
#[derive(Debug, Deserialize)]
struct RawViolation {
    #[serde(default)]
    file: Option<String>,
    #[serde(default)]
    line: Option<u32>,
    #[serde(default)]
    character: Option<u32>,
    #[serde(default)]
    severity: String,
    #[serde(default)]
    rule_id: String,
    #[serde(default)]
    reason: String,
}

impl From<RawViolation> for LintViolation {
    fn from(raw: RawViolation) -> Self {
        Self {
            file: raw.file.unwrap_or_default(),
            line: raw.line,
            column: raw.character,
            severity: raw.severity.to_lowercase(),
            rule_id: raw.rule_id,
            reason: raw.reason,
        }
    }
}

/// Locate the lint binary: the configured path if given, else `PATH`.
pub fn locate_swiftlint(configured: Option<&Path>) -> Result<PathBuf, TriageError> {
    let missing = || TriageError::ToolMissing {
        tool: SWIFTLINT.to_string(),
    };
    match configured {
        Some(path) if path.exists() => Ok(path.to_path_buf()),
        Some(_) => Err(missing()),
        None => which::which(SWIFTLINT).map_err(|_| missing()),
    }
}

/// Run SwiftLint over `target` and parse its violations.
pub fn run_lint(
    runner: &dyn CommandRunner,
    swiftlint: &Path,
    target: &Path,
    timeout: Duration,
) -> Result<LintReport, TriageError> {
    if !target.exists() {
        return Err(TriageError::MissingProject {
            path: target.to_path_buf(),
        });
    }
    // A single file is linted from its own directory, by file name.
    let (working_dir, path_arg) = if target.is_dir() {
        (target, None)
    } else {
        (parent_dir(target), target.file_name().map(Path::new))
    };

    let mut command = format!(
        "{} lint --reporter json --quiet",
        shell_escape::escape(swiftlint.display().to_string().into())
    );
    if let Some(path) = path_arg {
        command.push(' ');
        command.push_str(&shell_escape::escape(path.display().to_string().into()));
    }
    debug!(%command, "running lint");

    let output = runner.run(&command, Some(working_dir), timeout)?;
    let exit_ok = output.success() || output.exit_code == Some(VIOLATIONS_EXIT_CODE);
    if !exit_ok {
        return Err(TriageError::ToolFailed {
            tool: SWIFTLINT.to_string(),
            message: format!("exit {:?}: {}", output.exit_code, output.stderr.trim()),
        });
    }

    let report = parse_lint_output(&output.stdout)?;
    info!(
        errors = report.error_count(),
        warnings = report.warning_count(),
        "lint finished"
    );
    Ok(report)
}

/// Parse the JSON reporter's output. Empty output means no violations.
pub fn parse_lint_output(stdout: &str) -> Result<LintReport, TriageError> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Ok(LintReport::default());
    }

    let raw: Vec<RawViolation> =
        serde_json::from_str(trimmed).map_err(|e| TriageError::ToolFailed {
            tool: SWIFTLINT.to_string(),
            message: format!("unreadable reporter output: {e}"),
        })?;
    Ok(LintReport {
        violations: raw.into_iter().map(LintViolation::from).collect(),
    })
}
