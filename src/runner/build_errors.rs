//! Build error extraction from captured build output

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

use super::executor::CommandOutput;

/// Marker xcodebuild prints when compilation stops the run
const BUILD_FAILED_MARKERS: &[&str] = &["** BUILD FAILED **", "** TEST BUILD FAILED **"];

/// Lines of output kept when no individual error line can be found
const TAIL_LINES: usize = 20;

fn error_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // `path:line:col: error: msg`, `error: msg`, `ld: symbol(s) not found`, `fatal error: msg`
    RE.get_or_init(|| {
        Regex::new(r"(?:^|\s|:)(?:fatal )?error:\s|^ld: |^Undefined symbols? ")
            .expect("Invalid regex pattern")
    })
}

/// Whether the output says the build phase failed
pub fn build_failed(output: &CommandOutput) -> bool {
    let combined = output.combined();
    BUILD_FAILED_MARKERS
        .iter()
        .any(|marker| combined.contains(marker))
}

/// Error lines from `text`, deduplicated with first-occurrence order preserved.
pub fn extract_error_lines(text: &str) -> Vec<String> {
    let re = error_line_regex();
    let mut seen = HashSet::new();

    text.lines()
        .map(str::trim_end)
        .filter(|line| re.is_match(line))
        .filter(|line| seen.insert(line.to_string()))
        .map(str::to_string)
        .collect()
}

/// Build errors for a failed build: individual error lines, or the output tail if the
/// tool printed none.
pub fn collect_build_errors(output: &CommandOutput) -> Vec<String> {
    let combined = output.combined();
    let lines = extract_error_lines(&combined);
    if !lines.is_empty() {
        return lines;
    }

    let tail: Vec<&str> = combined
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect();
    let start = tail.len().saturating_sub(TAIL_LINES);
    let block = tail[start..].join("\n");
    if block.is_empty() {
        vec!["Build failed without output".to_string()]
    } else {
        vec![block]
    }
}
