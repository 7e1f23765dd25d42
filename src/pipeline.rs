//! Result interpretation: parse, classify, enrich

use std::path::Path;
use tracing::info;

use crate::classify::classify_record;
use crate::context::enrich_failures;
use crate::models::FailureRecord;
use crate::tree::{parse_result_tree, ResultStore};

/// Turn a result bundle into classified failure records with source context attached.
///
/// Traversal order is kept from the parser through to the returned list.
pub fn interpret_result_bundle(
    store: &dyn ResultStore,
    bundle: &Path,
    project_root: &Path,
) -> Vec<FailureRecord> {
    let records: Vec<FailureRecord> = parse_result_tree(store, bundle)
        .into_iter()
        .map(classify_record)
        .collect();
    let records = enrich_failures(records, project_root);

    info!(
        bundle = %bundle.display(),
        failures = records.len(),
        "interpreted result bundle"
    );
    records
}
