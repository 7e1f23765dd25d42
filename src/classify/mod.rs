//! Failure classification
//!
//! Heuristic signal fusion over the raw fields of a [`FailureRecord`]: UI-test detection,
//! category, severity and remediation hints. Everything here is a pure function of the
//! record's raw fields, so classifying the same record twice gives the same answer.
//!
//! Keyword groups are tried in a fixed order and the first match wins. UI-specific groups
//! are only consulted for UI tests and always before the generic ones, which is what makes
//! a message like "assert failed after tap" land in `uiInteraction`.

mod suggestions;
mod vocabulary;


use crate::models::{FailureCategory, FailureRecord, Severity};

pub use suggestions::suggestions_for;

/// Derived fields for one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub is_ui_test: bool,
    pub category: FailureCategory,
    pub severity: Severity,
    pub suggestions: Vec<String>,
}

/// Compute the derived fields of `record` from its raw fields.
pub fn classify(record: &FailureRecord) -> Classification {
    let is_ui_test = detect_ui_test(record);
    let text = failure_text(record);
    let category = categorize(&text, is_ui_test);
    let severity = assess_severity(category, &text);
    let suggestions = suggestions_for(category, &text);

    Classification {
        is_ui_test,
        category,
        severity,
        suggestions,
    }
}

/// Classify `record` and store the derived fields on it.
pub fn classify_record(mut record: FailureRecord) -> FailureRecord {
    let Classification {
        is_ui_test,
        category,
        severity,
        suggestions,
    } = classify(&record);
    record.is_ui_test = is_ui_test;
    record.category = category;
    record.severity = severity;
    record.suggestions = suggestions;
    record
}

/// Whether the record looks like it came from a UI test. Heuristic only.
pub fn detect_ui_test(record: &FailureRecord) -> bool {
    let haystack = format!(
        "{} {} {} {}",
        record.suite,
        record.identifier,
        record.message,
        record.stack_trace.as_deref().unwrap_or_default()
    )
    .to_lowercase();

    vocabulary::UI_VOCABULARY
        .iter()
        .any(|term| haystack.contains(term))
}

/// First matching category group wins; UI groups only apply to UI tests.
///
/// `text` must already be case-folded.
pub fn categorize(text: &str, is_ui_test: bool) -> FailureCategory {
    let ui_groups = if is_ui_test {
        vocabulary::UI_CATEGORY_GROUPS
    } else {
        &[]
    };

    ui_groups
        .iter()
        .chain(vocabulary::GENERIC_CATEGORY_GROUPS)
        .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or(FailureCategory::Other)
}

/// Severity tiers, evaluated critical → high → low with medium as the default.
///
/// `text` must already be case-folded.
pub fn assess_severity(category: FailureCategory, text: &str) -> Severity {
    let has_any = |markers: &[&str]| markers.iter().any(|m| text.contains(m));

    if category == FailureCategory::Crash || has_any(vocabulary::CRITICAL_MARKERS) {
        return Severity::Critical;
    }

    if matches!(
        category,
        FailureCategory::Build | FailureCategory::Setup | FailureCategory::ElementNotFound
    ) || has_any(vocabulary::HIGH_MARKERS)
    {
        return Severity::High;
    }

    if matches!(
        category,
        FailureCategory::Timeout | FailureCategory::UiTiming | FailureCategory::Accessibility
    ) || has_any(vocabulary::LOW_MARKERS)
    {
        return Severity::Low;
    }

    Severity::Medium
}

/// Folded message plus stack trace: the text categories and severities look at
fn failure_text(record: &FailureRecord) -> String {
    match &record.stack_trace {
        Some(stack) => format!("{}\n{}", record.message, stack).to_lowercase(),
        None => record.message.to_lowercase(),
    }
}
