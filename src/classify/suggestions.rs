//! Remediation hints attached to classified failures

use crate::models::FailureCategory;

/// Content-triggered hints, scanned in this order. Each entry fires at most once.
const CONTENT_HINTS: &[(&[&str], &str)] = &[
    (
        &["nil", "null"],
        "Check optional values and add guards before force-unwrapping",
    ),
    (
        &["network", "url"],
        "Mock network calls so the test does not depend on a live server",
    ),
    (
        &["index out of range", "out of bounds"],
        "Check collection bounds before indexing",
    ),
    (
        &["main thread", "mainactor"],
        "Make sure UI and main-actor state is only touched on the main thread",
    ),
    (
        &["simulator"],
        "Reset the simulator and verify the destination is available",
    ),
];

fn category_hints(category: FailureCategory) -> &'static [&'static str] {
    match category {
        FailureCategory::ElementNotFound => &[
            "Verify the element's accessibility identifier matches the query",
            "Wait for the element with waitForExistence(timeout:) before interacting",
            "Confirm the screen under test is actually presented",
        ],
        FailureCategory::Accessibility => &[
            "Set accessibilityIdentifier on the view under test",
            "Check accessibility labels and traits match what the test expects",
        ],
        FailureCategory::UiInteraction => &[
            "Ensure the element is hittable (visible, enabled, not covered) before interacting",
            "Scroll the element into view before tapping",
        ],
        FailureCategory::UiTiming => &[
            "Increase the wait timeout or wait on an explicit expectation",
            "Disable or shorten animations in the UI test launch arguments",
        ],
        FailureCategory::Assertion => &[
            "Compare the expected value in the assertion against the actual result",
            "Check whether the code under test changed behaviour intentionally",
        ],
        FailureCategory::Crash => &[
            "Inspect the stack trace for the crashing frame",
            "Look for force unwraps, out-of-bounds access or unhandled exceptions",
        ],
        FailureCategory::Timeout => &[
            "Look for deadlocks or unfulfilled expectations",
            "Raise the timeout only if the operation is legitimately slow",
        ],
        FailureCategory::Build => &[
            "Fix compiler errors in the test target first",
            "Check that the test target links every module it imports",
        ],
        FailureCategory::Setup => &[
            "Check setUp/setUpWithError for failing preconditions",
            "Make sure fixtures and test data are available",
        ],
        FailureCategory::Teardown => &[
            "Check tearDown for cleanup that throws or asserts",
            "Make sure resources are not released twice",
        ],
        FailureCategory::Other => &["Read the failure message and stack trace for details"],
    }
}

/// Build the ordered hint list: category hints first, then content hints.
///
/// `text` must already be case-folded.
pub fn suggestions_for(category: FailureCategory, text: &str) -> Vec<String> {
    let mut hints: Vec<String> = category_hints(category)
        .iter()
        .map(|hint| hint.to_string())
        .collect();

    for (markers, hint) in CONTENT_HINTS {
        if markers.iter().any(|marker| text.contains(marker)) {
            hints.push(hint.to_string());
        }
    }
    hints
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_hints_come_first() {
        let hints = suggestions_for(FailureCategory::Crash, "unexpectedly found nil");
        assert_eq!(hints[0], "Inspect the stack trace for the crashing frame");
        assert_eq!(
            hints.last().map(String::as_str),
            Some("Check optional values and add guards before force-unwrapping")
        );
    }

    #[test]
    fn test_content_hints_in_fixed_order() {
        let hints = suggestions_for(FailureCategory::Other, "url request returned null");
        assert_eq!(hints.len(), 3);
        assert!(hints[1].contains("optional"));
        assert!(hints[2].contains("network"));
    }

    #[test]
    fn test_every_category_has_hints() {
        for category in [
            FailureCategory::ElementNotFound,
            FailureCategory::Accessibility,
            FailureCategory::UiInteraction,
            FailureCategory::UiTiming,
            FailureCategory::Assertion,
            FailureCategory::Crash,
            FailureCategory::Timeout,
            FailureCategory::Build,
            FailureCategory::Setup,
            FailureCategory::Teardown,
            FailureCategory::Other,
        ] {
            assert!(!suggestions_for(category, "").is_empty(), "{category}");
        }
    }
}
