//! Typed view over result-tree JSON objects
//!
//! The result tool emits every value inside a typed wrapper (`{"_value": "…"}` for scalars,
//! `{"_values": […]}` for arrays). The accessors here unwrap those transparently and also
//! accept plain JSON, so every lookup tolerates a missing or differently shaped field.

use serde_json::Value;
use tracing::warn;

/// Keys whose arrays hold the children of a container node, in traversal order.
pub const CONTAINER_KEYS: &[&str] = &["summaries", "testableSummaries", "tests", "subtests"];

/// Recursion cap for tree conversion. Real bundles are a handful of levels deep.
pub const MAX_TREE_DEPTH: usize = 64;

/// Status of a test leaf
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestStatus {
    Success,
    Failure,
    Skipped,
    ExpectedFailure,
    Other(String),
}

impl TestStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.to_lowercase().as_str() {
            "success" | "passed" => TestStatus::Success,
            "failure" | "failed" => TestStatus::Failure,
            "skipped" => TestStatus::Skipped,
            "expected failure" | "expectedfailure" => TestStatus::ExpectedFailure,
            _ => TestStatus::Other(raw.to_string()),
        }
    }
}

/// A single test case in the tree.
#[derive(Debug, Clone)]
pub struct TestLeaf {
    pub name: String,
    pub identifier: String,
    pub status: TestStatus,
    /// Node id of the detailed summary object, fetched on demand
    pub summary_ref: Option<String>,
    /// Failure summaries already present on the leaf itself
    pub inline_details: Option<Value>,
}

/// Tagged-union view of one result-tree node.
#[derive(Debug, Clone)]
pub enum ResultNode {
    Container {
        name: String,
        children: Vec<ResultNode>,
    },
    Leaf(TestLeaf),
    /// Neither a container nor a test; ignored by the traversal
    Opaque,
}

impl ResultNode {
    /// Convert a JSON object into a typed node, recursively.
    pub fn from_value(value: &Value) -> Self {
        Self::from_value_at(value, 0)
    }

    fn from_value_at(value: &Value, depth: usize) -> Self {
        if depth >= MAX_TREE_DEPTH {
            warn!(depth, "result tree deeper than cap, ignoring subtree");
            return ResultNode::Opaque;
        }

        if let Some(status) = scalar(value, "testStatus") {
            let name = scalar(value, "name").unwrap_or_default();
            let identifier = scalar(value, "identifier").unwrap_or_else(|| name.clone());
            let summary_ref = value.get("summaryRef").and_then(|r| scalar(r, "id"));
            let inline_details = value
                .get("failureSummaries")
                .is_some()
                .then(|| value.clone());

            return ResultNode::Leaf(TestLeaf {
                name,
                identifier,
                status: TestStatus::parse(&status),
                summary_ref,
                inline_details,
            });
        }

        if !CONTAINER_KEYS.iter().any(|key| value.get(*key).is_some()) {
            return ResultNode::Opaque;
        }

        let name = scalar(value, "name")
            .or_else(|| scalar(value, "targetName"))
            .unwrap_or_default();
        let children = CONTAINER_KEYS
            .iter()
            .flat_map(|key| values(value, key))
            .map(|child| Self::from_value_at(child, depth + 1))
            .collect();

        ResultNode::Container { name, children }
    }
}

/// Read a scalar field, unwrapping `{"_value": …}` if present.
pub fn scalar(value: &Value, key: &str) -> Option<String> {
    let field = value.get(key)?;
    let inner = field.get("_value").unwrap_or(field);
    match inner {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Read an array field, unwrapping `{"_values": […]}` if present. Missing → empty.
pub fn values<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(|field| field.get("_values").or(Some(field)))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_unwraps_typed_value() {
        let v = json!({"name": {"_type": {"_name": "String"}, "_value": "LoginTests"}});
        assert_eq!(scalar(&v, "name").as_deref(), Some("LoginTests"));
    }

    #[test]
    fn test_scalar_accepts_plain_json() {
        let v = json!({"name": "plain", "lineNumber": 12});
        assert_eq!(scalar(&v, "name").as_deref(), Some("plain"));
        assert_eq!(scalar(&v, "lineNumber").as_deref(), Some("12"));
        assert_eq!(scalar(&v, "missing"), None);
    }

    #[test]
    fn test_values_missing_is_empty() {
        let v = json!({"subtests": {"_values": [1, 2]}});
        assert_eq!(values(&v, "subtests").len(), 2);
        assert!(values(&v, "tests").is_empty());
        assert!(values(&json!({"tests": "nope"}), "tests").is_empty());
    }

    #[test]
    fn test_from_value_leaf() {
        let v = json!({
            "name": {"_value": "testLogin()"},
            "identifier": {"_value": "LoginTests/testLogin()"},
            "testStatus": {"_value": "Failure"},
            "summaryRef": {"id": {"_value": "0~abc"}}
        });
        match ResultNode::from_value(&v) {
            ResultNode::Leaf(leaf) => {
                assert_eq!(leaf.identifier, "LoginTests/testLogin()");
                assert_eq!(leaf.status, TestStatus::Failure);
                assert_eq!(leaf.summary_ref.as_deref(), Some("0~abc"));
                assert!(leaf.inline_details.is_none());
            }
            other => panic!("expected leaf, got {other:?}"),
        }
    }

    #[test]
    fn test_from_value_container_without_children_field() {
        let v = json!({"name": "Empty", "subtests": {}});
        match ResultNode::from_value(&v) {
            ResultNode::Container { name, children } => {
                assert_eq!(name, "Empty");
                assert!(children.is_empty());
            }
            other => panic!("expected container, got {other:?}"),
        }
    }

    #[test]
    fn test_from_value_opaque() {
        assert!(matches!(
            ResultNode::from_value(&json!({"foo": 1})),
            ResultNode::Opaque
        ));
    }

    #[test]
    fn test_depth_cap() {
        let mut v = json!({"name": "leaf", "testStatus": "Failure"});
        for _ in 0..(MAX_TREE_DEPTH + 5) {
            v = json!({"name": "g", "subtests": [v]});
        }
        // Must terminate and not panic; the over-deep part collapses to Opaque
        let node = ResultNode::from_value(&v);
        assert!(matches!(node, ResultNode::Container { .. }));
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(TestStatus::parse("Failure"), TestStatus::Failure);
        assert_eq!(TestStatus::parse("Success"), TestStatus::Success);
        assert_eq!(TestStatus::parse("Expected Failure"), TestStatus::ExpectedFailure);
        assert_eq!(
            TestStatus::parse("Mixed"),
            TestStatus::Other("Mixed".to_string())
        );
    }
}
