//! Fixed explanations and next-step hints per outcome

use crate::error::ErrorKind;

pub struct Template {
    pub title: &'static str,
    pub explanation: &'static str,
    pub next_steps: &'static [&'static str],
}

pub const INVALID_INPUT: Template = Template {
    title: "Invalid task request",
    explanation: "The request could not be run as given.",
    next_steps: &[
        "Fix the fields listed above and resubmit the request",
        "Test tasks need a project and a scheme; analyze tasks need a result bundle",
    ],
};

pub const NEEDS_CONTEXT: Template = Template {
    title: "More context needed",
    explanation: "Remediation stopped because the failures below cannot be fixed from the information collected so far.",
    next_steps: &[
        "Read the files named in the build errors and failures below",
        "Provide the missing source or configuration and run the task again",
    ],
};

pub const EXECUTION_ERROR: Template = Template {
    title: "Execution error",
    explanation: "The task did not produce a result.",
    next_steps: &[
        "Re-run with TRIAGE_LOG=debug to see what happened",
        "Check that Xcode command line tools are installed (xcode-select -p)",
    ],
};

pub const SUCCESS: Template = Template {
    title: "Success",
    explanation: "The task completed with no build errors and no failing tests.",
    next_steps: &[],
};

/// Template for a named failure kind.
pub fn for_kind(kind: ErrorKind) -> Template {
    match kind {
        ErrorKind::BuildError => Template {
            title: "Build failed",
            explanation: "The project did not compile, so no tests ran.",
            next_steps: &[
                "Fix the first build error; later errors often follow from it",
                "Re-run the tests once the project builds",
            ],
        },
        ErrorKind::TestFailures => Template {
            title: "Tests failed",
            explanation: "Some tests failed and no further attempts were made.",
            next_steps: &[
                "Work through the failures by severity, critical first",
                "Re-run the task after each fix to confirm it",
            ],
        },
        ErrorKind::MissingProject => Template {
            title: "Project not found",
            explanation: "No Xcode project or workspace exists at the given path.",
            next_steps: &[
                "Check the project path points at an .xcodeproj, an .xcworkspace, or a directory holding exactly one",
                "Run triage from the directory that contains the project",
            ],
        },
        ErrorKind::MaxRetries => Template {
            title: "Attempts exhausted",
            explanation: "Tests were still failing after the last allowed attempt.",
            next_steps: &[
                "Look for failures that repeat across attempts; those are not flaky",
                "Raise max_attempts in triage.toml only if the failures are timing related",
            ],
        },
        ErrorKind::NeedsContext => NEEDS_CONTEXT,
        ErrorKind::SwiftlintNotInstalled => Template {
            title: "SwiftLint not installed",
            explanation: "Linting needs the swiftlint binary, which was not found.",
            next_steps: &[
                "Install it with `brew install swiftlint`",
                "Or set swiftlint_path in triage.toml",
            ],
        },
        ErrorKind::ToolExecutionFailed => Template {
            title: "Tool execution failed",
            explanation: "An external tool ran but its output could not be used.",
            next_steps: &[
                "Run the tool by hand to see its full output",
                "Re-run with TRIAGE_LOG=debug for the exact command",
            ],
        },
        ErrorKind::UnknownTaskType => Template {
            title: "Unknown task type",
            explanation: "The request named a task type triage does not handle.",
            next_steps: &["Use one of: test, lint, analyze"],
        },
        ErrorKind::UnknownError => Template {
            title: "Unexpected error",
            explanation: "The task failed for a reason triage could not classify.",
            next_steps: &[
                "Re-run with TRIAGE_LOG=debug and check the log output",
                "Check the project builds and tests from Xcode",
            ],
        },
    }
}
