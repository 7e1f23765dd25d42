use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a failed test case.
///
/// The first four are only reachable for UI tests. Ordering of the variants matches the
/// order in which the classifier tries them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum FailureCategory {
    /// UI element could not be located on screen
    ElementNotFound,
    /// Accessibility identifiers, labels or traits are wrong or missing
    Accessibility,
    /// A tap, swipe, scroll or typing action did not take effect
    UiInteraction,
    /// UI waited too long for an element, animation or idle state
    UiTiming,
    /// An assertion evaluated to false
    Assertion,
    /// The test process crashed
    Crash,
    /// The test exceeded its allotted time
    Timeout,
    /// Build or linking problem surfaced inside a test
    Build,
    /// setUp failed before the test body ran
    Setup,
    /// tearDown failed after the test body ran
    Teardown,
    /// Nothing else matched
    Other,
}

impl FailureCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureCategory::ElementNotFound => "elementNotFound",
            FailureCategory::Accessibility => "accessibility",
            FailureCategory::UiInteraction => "uiInteraction",
            FailureCategory::UiTiming => "uiTiming",
            FailureCategory::Assertion => "assertion",
            FailureCategory::Crash => "crash",
            FailureCategory::Timeout => "timeout",
            FailureCategory::Build => "build",
            FailureCategory::Setup => "setup",
            FailureCategory::Teardown => "teardown",
            FailureCategory::Other => "other",
        }
    }
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Remediation priority of a failure. Declared most urgent first so that sorting and
/// `BTreeMap` keys follow critical → high → medium → low.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    /// All tiers in reporting order
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source code attached to a failure for the fixing agent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SourceContext {
    /// Enclosing test method, or a numbered window around the failing line
    pub test_code: String,
    /// Leading import statements of the file, in file order
    pub imports: Vec<String>,
}

/// One failed test case, flattened out of the result tree.
///
/// The raw fields come from the result tree. `is_ui_test`, `category`, `severity` and
/// `suggestions` are derived by [`crate::classify::classify_record`] and are pure
/// functions of the raw fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FailureRecord {
    /// Qualified test name (target/class/method)
    pub identifier: String,
    /// Enclosing suite name; empty when not resolvable
    pub suite: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,
    /// Artifact paths in the order the tool listed them
    pub attachments: Vec<String>,
    #[serde(rename = "isUITest")]
    pub is_ui_test: bool,
    pub category: FailureCategory,
    pub severity: Severity,
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_context: Option<SourceContext>,
}

impl FailureRecord {
    /// Create an unclassified record with the raw identity fields set.
    pub fn new(
        identifier: impl Into<String>,
        suite: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            suite: suite.into(),
            file: None,
            line: None,
            message: message.into(),
            stack_trace: None,
            attachments: Vec::new(),
            is_ui_test: false,
            category: FailureCategory::Other,
            severity: Severity::Medium,
            suggestions: Vec::new(),
            source_context: None,
        }
    }

    /// Attach a source location
    pub fn with_location(mut self, file: impl Into<String>, line: Option<u32>) -> Self {
        self.file = Some(file.into());
        self.line = line;
        self
    }

    /// Attach a stack trace
    pub fn with_stack_trace(mut self, stack_trace: impl Into<String>) -> Self {
        self.stack_trace = Some(stack_trace.into());
        self
    }

    /// Short location label such as `LoginTests.swift:42`
    pub fn location(&self) -> Option<String> {
        let file = self.file.as_deref()?;
        Some(match self.line {
            Some(line) => format!("{file}:{line}"),
            None => file.to_string(),
        })
    }
}
