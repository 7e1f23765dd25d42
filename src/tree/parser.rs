//! Flattening a result tree into failure records

use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, warn};

use super::node::{scalar, values, ResultNode, TestLeaf, TestStatus};
use super::store::ResultStore;
use crate::models::FailureRecord;

/// Fallback message when a failing test carries no failure summary
const DEFAULT_FAILURE_MESSAGE: &str = "Test failed";

/// Attachment extensions worth handing to a fixer (screenshots)
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "heic", "gif", "tiff"];

/// A failing leaf together with the suite it was found under
struct FailingLeaf<'a> {
    suite: String,
    leaf: &'a TestLeaf,
}

/// Parse the result artifact at `artifact` into unclassified failure records.
///
/// Never fails: an artifact that cannot be located or parsed yields an empty list and a
/// warning in the log. Callers disambiguate "no tree" through the run's build errors.
pub fn parse_result_tree(store: &dyn ResultStore, artifact: &Path) -> Vec<FailureRecord> {
    let root = match store.get_object(artifact, None) {
        Ok(root) => root,
        Err(e) => {
            warn!(artifact = %artifact.display(), error = %format!("{e:#}"), "could not load result tree");
            return Vec::new();
        }
    };

    let mut records = Vec::new();
    for tree in test_trees(store, artifact, &root) {
        let node = ResultNode::from_value(&tree);
        let mut failing = Vec::new();
        collect_failures(&node, "", &mut failing);

        for FailingLeaf { suite, leaf } in failing {
            records.push(leaf_to_record(store, artifact, suite, leaf));
        }
    }

    let seen: HashSet<String> = records
        .iter()
        .map(|r| normalize_test_name(&r.identifier))
        .collect();
    for issue in root_issues(&root) {
        let name = scalar(issue, "testCaseName").unwrap_or_default();
        if !name.is_empty() && seen.contains(&normalize_test_name(&name)) {
            continue;
        }
        records.push(issue_to_record(issue));
    }

    debug!(artifact = %artifact.display(), count = records.len(), "parsed result tree");
    records
}

/// Locate the test summary trees reachable from the root object.
///
/// Real bundles keep them behind each action's `testsRef`; exported or hand-built trees
/// may carry the containers directly on the root.
fn test_trees(store: &dyn ResultStore, artifact: &Path, root: &Value) -> Vec<Value> {
    let refs: Vec<String> = values(root, "actions")
        .iter()
        .filter_map(|action| action.get("actionResult"))
        .filter_map(|result| result.get("testsRef"))
        .filter_map(|tests_ref| scalar(tests_ref, "id"))
        .collect();

    if refs.is_empty() {
        return vec![root.clone()];
    }

    refs.iter()
        .filter_map(|id| match store.get_object(artifact, Some(id)) {
            Ok(tree) => Some(tree),
            Err(e) => {
                warn!(id = %id, error = %format!("{e:#}"), "could not load test summaries");
                None
            }
        })
        .collect()
}

/// Depth-first walk; containers pass down their name (or the inherited one if unnamed).
fn collect_failures<'a>(node: &'a ResultNode, suite: &str, out: &mut Vec<FailingLeaf<'a>>) {
    match node {
        ResultNode::Container { name, children } => {
            let suite = if name.is_empty() { suite } else { name.as_str() };
            for child in children {
                collect_failures(child, suite, out);
            }
        }
        ResultNode::Leaf(leaf) if leaf.status == TestStatus::Failure => {
            out.push(FailingLeaf {
                suite: strip_bundle_suffix(suite).to_string(),
                leaf,
            });
        }
        ResultNode::Leaf(_) | ResultNode::Opaque => {}
    }
}

fn leaf_to_record(
    store: &dyn ResultStore,
    artifact: &Path,
    suite: String,
    leaf: &TestLeaf,
) -> FailureRecord {
    let identifier = if leaf.identifier.is_empty() {
        format!("{suite}/{}", leaf.name)
    } else {
        leaf.identifier.clone()
    };
    let mut record = FailureRecord::new(identifier, suite, DEFAULT_FAILURE_MESSAGE);

    let details = match (&leaf.inline_details, &leaf.summary_ref) {
        (Some(inline), _) => Some(inline.clone()),
        (None, Some(id)) => match store.get_object(artifact, Some(id)) {
            Ok(summary) => Some(summary),
            Err(e) => {
                warn!(test = %record.identifier, error = %format!("{e:#}"), "could not load test summary");
                None
            }
        },
        (None, None) => None,
    };

    if let Some(details) = details {
        apply_details(&mut record, &details);
    }
    record
}

/// Fill message, location, stack trace and attachments from a test summary object.
fn apply_details(record: &mut FailureRecord, summary: &Value) {
    let failures = values(summary, "failureSummaries");

    let messages: Vec<String> = failures
        .iter()
        .filter_map(|f| scalar(f, "message"))
        .filter(|m| !m.trim().is_empty())
        .collect();
    if !messages.is_empty() {
        record.message = messages.join("\n");
    }

    if let Some(first) = failures.iter().find(|f| scalar(f, "fileName").is_some()) {
        record.file = scalar(first, "fileName");
        record.line = scalar(first, "lineNumber").and_then(|l| l.parse().ok());
    }

    record.stack_trace = failures.iter().find_map(first_stack_frame);

    for failure in failures {
        collect_image_attachments(failure, &mut record.attachments);
    }
    for activity in values(summary, "activitySummaries") {
        collect_activity_attachments(activity, &mut record.attachments, 0);
    }
}

fn first_stack_frame(failure: &Value) -> Option<String> {
    let context = failure.get("sourceCodeContext")?;
    values(context, "callStack").iter().find_map(|frame| {
        let symbol = frame.get("symbolInfo")?;
        let name = scalar(symbol, "symbolName")?;
        let location = symbol.get("location").and_then(|loc| {
            let file = scalar(loc, "filePath")?;
            Some(match scalar(loc, "lineNumber") {
                Some(line) => format!("{file}:{line}"),
                None => file,
            })
        });
        Some(match location {
            Some(loc) => format!("{name} ({loc})"),
            None => name,
        })
    })
}

fn collect_activity_attachments(activity: &Value, out: &mut Vec<String>, depth: usize) {
    if depth >= super::node::MAX_TREE_DEPTH {
        return;
    }
    collect_image_attachments(activity, out);
    for sub in values(activity, "subactivities") {
        collect_activity_attachments(sub, out, depth + 1);
    }
}

fn collect_image_attachments(holder: &Value, out: &mut Vec<String>) {
    for attachment in values(holder, "attachments") {
        if let Some(name) = scalar(attachment, "filename") {
            if is_image(&name) {
                out.push(name);
            }
        }
    }
}

fn is_image(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Test failure issues recorded on the root object and on each action result.
fn root_issues(root: &Value) -> Vec<&Value> {
    let mut issues: Vec<&Value> = root
        .get("issues")
        .map(|i| values(i, "testFailureSummaries").iter().collect())
        .unwrap_or_default();

    for action in values(root, "actions") {
        if let Some(action_issues) = action
            .get("actionResult")
            .and_then(|result| result.get("issues"))
        {
            issues.extend(values(action_issues, "testFailureSummaries"));
        }
    }
    issues
}

fn issue_to_record(issue: &Value) -> FailureRecord {
    let identifier = scalar(issue, "testCaseName")
        .or_else(|| scalar(issue, "producingTarget"))
        .unwrap_or_else(|| "unknown".to_string());
    let message = scalar(issue, "message").unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string());
    let mut record = FailureRecord::new(identifier, "", message);

    if let Some(url) = issue
        .get("documentLocationInCreatingWorkspace")
        .and_then(|loc| scalar(loc, "url"))
    {
        let (file, line) = parse_document_url(&url);
        record.file = file;
        record.line = line;
    }
    record
}

/// Split `file:///path/File.swift#...&StartingLineNumber=41&...` into a path and a
/// 1-based line. The tool's line numbers are 0-based.
fn parse_document_url(url: &str) -> (Option<String>, Option<u32>) {
    let (path, fragment) = match url.split_once('#') {
        Some((path, fragment)) => (path, Some(fragment)),
        None => (url, None),
    };
    let path = path.strip_prefix("file://").unwrap_or(path);
    let file = (!path.is_empty()).then(|| path.to_string());

    let line = fragment.and_then(|fragment| {
        fragment
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == "StartingLineNumber")
            .and_then(|(_, value)| value.parse::<u32>().ok())
            .map(|line| line + 1)
    });
    (file, line)
}

/// `Foo.testBar()` and `Foo/testBar()` name the same test
fn normalize_test_name(name: &str) -> String {
    name.trim_end_matches("()").replace('.', "/").to_lowercase()
}

fn strip_bundle_suffix(suite: &str) -> &str {
    suite.strip_suffix(".xctest").unwrap_or(suite)
}
