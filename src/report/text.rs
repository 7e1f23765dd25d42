//! Human-readable narrative, rendered as markdown

use super::templates::Template;
use crate::lint::LintReport;
use crate::models::{FailureRecord, Severity};

/// Lines of the narrative being built
#[derive(Default)]
pub struct Narrative {
    lines: Vec<String>,
}

impl Narrative {
    pub fn heading(&mut self, template: &Template) {
        self.lines.push(format!("# {}", template.title));
        self.lines.push(String::new());
        self.lines.push(template.explanation.to_string());
    }

    pub fn list(&mut self, title: &str, items: &[String]) {
        if items.is_empty() {
            return;
        }
        self.lines.push(String::new());
        self.lines.push(format!("## {title} ({})", items.len()));
        self.lines.push(String::new());
        self.lines.extend(items.iter().map(|item| format!("- {item}")));
    }

    pub fn build_errors(&mut self, build_errors: &[String]) {
        if build_errors.is_empty() {
            return;
        }
        self.lines.push(String::new());
        self.lines.push(format!("## Build errors ({})", build_errors.len()));
        for (index, error) in build_errors.iter().enumerate() {
            self.lines.push(String::new());
            self.lines.push(format!("{}. ```", index + 1));
            self.lines.extend(error.lines().map(|line| format!("   {line}")));
            self.lines.push("   ```".to_string());
        }
    }

    /// Failures grouped critical → high → medium → low; empty tiers are skipped.
    pub fn failures_by_severity(&mut self, failures: &[FailureRecord]) {
        for severity in Severity::ALL {
            let group: Vec<&FailureRecord> =
                failures.iter().filter(|f| f.severity == severity).collect();
            if group.is_empty() {
                continue;
            }
            self.lines.push(String::new());
            self.lines.push(format!(
                "## {} ({})",
                capitalize(severity.as_str()),
                group.len()
            ));
            for failure in group {
                self.failure(failure);
            }
        }
    }

    /// Failures in traversal order with a compact one-line form
    pub fn failure_list(&mut self, failures: &[FailureRecord]) {
        let items: Vec<String> = failures
            .iter()
            .map(|f| match f.location() {
                Some(location) => format!("{} ({location}): {}", f.identifier, f.message),
                None => format!("{}: {}", f.identifier, f.message),
            })
            .collect();
        self.list("Failures", &items);
    }

    fn failure(&mut self, failure: &FailureRecord) {
        self.lines.push(String::new());
        self.lines.push(format!("### {}", failure.identifier));
        self.lines.push(String::new());
        if !failure.suite.is_empty() {
            self.lines.push(format!("- Suite: {}", failure.suite));
        }
        if let Some(file) = &failure.file {
            self.lines.push(format!("- File: {file}"));
        }
        if let Some(line) = failure.line {
            self.lines.push(format!("- Line: {line}"));
        }
        let ui = if failure.is_ui_test { " (UI test)" } else { "" };
        self.lines.push(format!("- Category: {}{ui}", failure.category));
        self.lines.push(format!("- Message: {}", failure.message));

        if !failure.suggestions.is_empty() {
            self.lines.push("- Suggestions:".to_string());
            self.lines
                .extend(failure.suggestions.iter().map(|s| format!("  - {s}")));
        }
        if !failure.attachments.is_empty() {
            self.lines.push("- Attachments:".to_string());
            self.lines
                .extend(failure.attachments.iter().map(|a| format!("  - {a}")));
        }
        if let Some(context) = &failure.source_context {
            self.lines.push(String::new());
            self.lines.push("```swift".to_string());
            self.lines.extend(context.imports.iter().cloned());
            if !context.imports.is_empty() {
                self.lines.push(String::new());
            }
            self.lines.push(context.test_code.clone());
            self.lines.push("```".to_string());
        }
    }

    pub fn lint(&mut self, lint: &LintReport) {
        self.lines.push(String::new());
        self.lines.push(format!(
            "## Lint ({} errors, {} warnings)",
            lint.error_count(),
            lint.warning_count()
        ));
        if lint.is_clean() {
            self.lines.push(String::new());
            self.lines.push("No violations.".to_string());
            return;
        }
        self.lines.push(String::new());
        for violation in &lint.violations {
            let location = match violation.line {
                Some(line) => format!("{}:{line}", violation.file),
                None => violation.file.clone(),
            };
            self.lines.push(format!(
                "- [{}] {location} {}: {}",
                violation.severity, violation.rule_id, violation.reason
            ));
        }
    }

    pub fn next_steps(&mut self, steps: &[String]) {
        if steps.is_empty() {
            return;
        }
        self.lines.push(String::new());
        self.lines.push("## Next steps".to_string());
        self.lines.push(String::new());
        self.lines.extend(
            steps
                .iter()
                .enumerate()
                .map(|(index, step)| format!("{}. {step}", index + 1)),
        );
    }

    pub fn finish(self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceContext;

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("critical"), "Critical");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_failure_detail_lines() {
        let mut failure = FailureRecord::new("LoginTests/testA()", "LoginTests", "boom")
            .with_location("LoginTests.swift", Some(17));
        failure.suggestions = vec!["Check it".to_string()];
        failure.attachments = vec!["shot.png".to_string()];
        failure.source_context = Some(SourceContext {
            test_code: "func testA() {}".to_string(),
            imports: vec!["import XCTest".to_string()],
        });

        let mut narrative = Narrative::default();
        narrative.failures_by_severity(&[failure]);
        let text = narrative.finish();

        assert!(text.contains("## Medium (1)"));
        assert!(text.contains("- Suite: LoginTests"));
        assert!(text.contains("- File: LoginTests.swift"));
        assert!(text.contains("- Line: 17"));
        assert!(text.contains("  - Check it"));
        assert!(text.contains("  - shot.png"));
        assert!(text.contains("```swift\nimport XCTest\n\nfunc testA() {}\n```"));
    }

    #[test]
    fn test_empty_list_renders_nothing() {
        let mut narrative = Narrative::default();
        narrative.list("Errors", &[]);
        narrative.next_steps(&[]);
        assert_eq!(narrative.finish(), "\n");
    }
}
