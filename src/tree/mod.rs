//! Result tree parsing
//!
//! Walks the nested result tree produced by the test runner and flattens every failing
//! test case into a [`FailureRecord`](crate::models::FailureRecord), in traversal order
//! (suite-major, then declaration order within a suite).

mod node;
mod parser;
mod store;


pub use node::{ResultNode, TestLeaf, TestStatus, MAX_TREE_DEPTH};
pub use parser::parse_result_tree;
pub use store::{AutoStore, ExportedStore, ResultStore, XcresultTool, DEFAULT_LOOKUP_TIMEOUT};
