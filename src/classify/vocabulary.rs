//! Keyword tables used by the classifier. All entries are lowercase.

use crate::models::FailureCategory;

/// Any of these in the folded suite/identifier/message/stack marks a UI test.
pub const UI_VOCABULARY: &[&str] = &[
    // framework types
    "xcuiapplication",
    "xcuielement",
    "xcuielementquery",
    "xcuitest",
    "uitest",
    "ui test",
    // lookup failures
    "element not found",
    "view not found",
    "button not found",
    "no matches found",
    "failed to find",
    "unable to find",
    "waitforexistence",
    "hittable",
    // accessibility
    "accessibility",
    "accessibilityidentifier",
    "accessibilitylabel",
    "voiceover",
    // interaction
    "tap",
    "swipe",
    "scroll",
    "typetext",
    "press(",
    "long press",
    "pinch",
    "drag",
    // timing
    "animation",
    "wait for app to idle",
    "idle",
    "on screen",
];

/// UI-only category groups, tried in this order when the record is a UI test.
pub const UI_CATEGORY_GROUPS: &[(FailureCategory, &[&str])] = &[
    (
        FailureCategory::ElementNotFound,
        &[
            "element not found",
            "no matches found",
            "failed to find",
            "unable to find",
            "not found",
            "does not exist",
            "doesn't exist",
            "no element",
            "multiple matching elements",
        ],
    ),
    (
        FailureCategory::Accessibility,
        &[
            "accessibility",
            "accessibilityidentifier",
            "accessibilitylabel",
            "voiceover",
            "a11y",
        ],
    ),
    (
        FailureCategory::UiInteraction,
        &[
            "tap",
            "swipe",
            "scroll",
            "typetext",
            "type text",
            "press(",
            "long press",
            "click",
            "drag",
            "pinch",
            "not hittable",
            "hittable",
            "gesture",
        ],
    ),
    (
        FailureCategory::UiTiming,
        &[
            "timed out",
            "timeout",
            "wait",
            "animation",
            "idle",
            "expectation",
            "still visible",
        ],
    ),
];

/// Generic category groups, tried in this order after the UI groups.
pub const GENERIC_CATEGORY_GROUPS: &[(FailureCategory, &[&str])] = &[
    (
        FailureCategory::Assertion,
        &[
            "xctassert",
            "assert",
            "xctfail",
            "expectation failed",
            "is not equal",
            "not equal to",
            "#expect",
        ],
    ),
    (
        FailureCategory::Crash,
        &[
            "crash",
            "fatal error",
            "exc_bad_access",
            "exc_breakpoint",
            "sigabrt",
            "sigsegv",
            "sigtrap",
            "segmentation fault",
            "unexpectedly found nil",
            "uncaught exception",
        ],
    ),
    (
        FailureCategory::Timeout,
        &[
            "timed out",
            "timeout",
            "exceeded",
            "deadline",
            "took too long",
        ],
    ),
    (
        FailureCategory::Build,
        &[
            "build failed",
            "build",
            "compile",
            "linker",
            "undefined symbol",
            "no such module",
        ],
    ),
    (
        FailureCategory::Setup,
        &["setup", "set up", "setupwitherror", "beforeeach"],
    ),
    (
        FailureCategory::Teardown,
        &["teardown", "tear down", "teardownwitherror", "aftereach"],
    ),
];

/// Severity markers checked against the folded message and stack trace
pub const CRITICAL_MARKERS: &[&str] = &["fatal", "abort"];
pub const HIGH_MARKERS: &[&str] = &["error"];
pub const LOW_MARKERS: &[&str] = &["warning"];
