//! Source context extraction for failing tests
//!
//! Given a test file and (optionally) the failing line, pull out the import block and the
//! body of the enclosing test method so a fixer sees the code that failed without opening
//! the file. Best effort: an unreadable file simply yields no context.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::models::{FailureRecord, SourceContext};


/// Lines shown on each side of the target when no enclosing method is found
pub const WINDOW_RADIUS: usize = 10;

/// Longest method body extracted before truncating
pub const MAX_METHOD_LINES: usize = 200;

const TRUNCATION_MARKER: &str = "    // ... truncated";

/// Extract imports and test code for `file`, resolving relative paths against
/// `project_root`.
pub fn extract_source_context(
    file: &str,
    line: Option<u32>,
    project_root: &Path,
) -> Option<SourceContext> {
    let path = resolve_path(file, project_root);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "no source context");
            return None;
        }
    };

    let lines: Vec<&str> = content.lines().collect();
    let imports = leading_imports(&lines);
    let test_code = match line {
        Some(line) => code_around_line(&lines, line),
        None => all_test_methods(&lines),
    };

    Some(SourceContext { test_code, imports })
}

/// Attach source context to every record that has a file.
pub fn enrich_failures(records: Vec<FailureRecord>, project_root: &Path) -> Vec<FailureRecord> {
    records
        .into_iter()
        .map(|mut record| {
            if let Some(file) = record.file.as_deref() {
                record.source_context = extract_source_context(file, record.line, project_root);
            }
            record
        })
        .collect()
}

fn resolve_path(file: &str, project_root: &Path) -> PathBuf {
    let path = Path::new(file);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}

/// Contiguous run of import statements at the top of the file.
///
/// Blank lines, comments and bare attributes are skipped; the first other line ends the
/// block.
fn leading_imports(lines: &[&str]) -> Vec<String> {
    let mut imports = Vec::new();
    let mut in_block_comment = false;

    for line in lines {
        let mut trimmed = line.trim();
        if in_block_comment {
            match trimmed.find("*/") {
                Some(end) => {
                    in_block_comment = false;
                    trimmed = trimmed[end + 2..].trim();
                }
                None => continue,
            }
        }
        if let Some(rest) = trimmed.strip_prefix("/*") {
            match rest.find("*/") {
                Some(end) => trimmed = rest[end + 2..].trim(),
                None => {
                    in_block_comment = true;
                    continue;
                }
            }
        }

        if trimmed.is_empty() || trimmed.starts_with("//") {
            continue;
        }
        if trimmed.starts_with("import ") {
            imports.push(trimmed.to_string());
            continue;
        }
        if trimmed.starts_with('@') {
            if trimmed.contains(" import ") {
                imports.push(trimmed.to_string());
            }
            continue;
        }
        break;
    }

    imports
}

/// Enclosing test method of a 1-based `line`, or a numbered window around it.
fn code_around_line(lines: &[&str], line: u32) -> String {
    if lines.is_empty() {
        return String::new();
    }
    let target = (line.max(1) as usize - 1).min(lines.len() - 1);

    for start in (0..=target).rev() {
        let previous = start.checked_sub(1).map(|i| lines[i]);
        if !is_test_declaration(lines[start], previous) {
            continue;
        }
        let method = extract_method(lines, start);
        if method.end >= target {
            return method.body;
        }
        break;
    }

    numbered_window(lines, target)
}

/// Every test method in the file, separated by blank lines.
fn all_test_methods(lines: &[&str]) -> String {
    let mut bodies = Vec::new();
    let mut index = 0;

    while index < lines.len() {
        let previous = index.checked_sub(1).map(|i| lines[i]);
        if is_test_declaration(lines[index], previous) {
            let method = extract_method(lines, index);
            bodies.push(method.body);
            index = method.end + 1;
        } else {
            index += 1;
        }
    }

    bodies.join("\n\n")
}

/// `func testSomething(` or any `func` carrying the `@Test` attribute.
fn is_test_declaration(line: &str, previous: Option<&str>) -> bool {
    let code = strip_line_comment(line);
    let Some(index) = code.find("func ") else {
        return false;
    };
    if index > 0 && !code[..index].ends_with(|c: char| c.is_whitespace()) {
        return false;
    }

    let name = code[index + "func ".len()..].trim_start();
    name.starts_with("test")
        || code.contains("@Test")
        || previous.is_some_and(|p| p.trim_start().starts_with("@Test"))
}

struct Method {
    body: String,
    /// Index of the last line included
    end: usize,
}

/// Collect lines from `start` until braces balance, capped at MAX_METHOD_LINES.
fn extract_method(lines: &[&str], start: usize) -> Method {
    let mut body = Vec::new();
    let mut depth: i64 = 0;
    let mut opened = false;

    for (index, line) in lines.iter().enumerate().skip(start) {
        if body.len() == MAX_METHOD_LINES {
            body.push(TRUNCATION_MARKER.to_string());
            return Method {
                body: body.join("\n"),
                end: index - 1,
            };
        }

        body.push(line.to_string());
        let (opens, closes) = count_braces(line);
        opened |= opens > 0;
        depth += opens - closes;

        if opened && depth <= 0 {
            return Method {
                body: body.join("\n"),
                end: index,
            };
        }
    }

    Method {
        body: body.join("\n"),
        end: lines.len().saturating_sub(1),
    }
}

/// Count braces outside string literals and line comments.
fn count_braces(line: &str) -> (i64, i64) {
    let mut opens = 0;
    let mut closes = 0;
    let mut in_string = false;
    let mut escaped = false;

    for c in strip_line_comment(line).chars() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => opens += 1,
            '}' => closes += 1,
            _ => {}
        }
    }

    (opens, closes)
}

fn strip_line_comment(line: &str) -> &str {
    match line.find("//") {
        Some(index) => &line[..index],
        None => line,
    }
}

fn numbered_window(lines: &[&str], target: usize) -> String {
    let first = target.saturating_sub(WINDOW_RADIUS);
    let last = (target + WINDOW_RADIUS).min(lines.len() - 1);

    (first..=last)
        .map(|index| {
            let marker = if index == target { '>' } else { ' ' };
            format!("{marker} {:>4} | {}", index + 1, lines[index])
        })
        .collect::<Vec<_>>()
        .join("\n")
}
