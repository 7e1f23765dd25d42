//! `triage lint`: run SwiftLint over a project

use anyhow::Result;
use std::path::PathBuf;

use super::{load_config, run_single, GlobalOptions};
use crate::task::TaskRequest;

/// Execute the lint command
pub fn execute(project: PathBuf, swiftlint: Option<PathBuf>, options: &GlobalOptions) -> Result<bool> {
    let mut config = load_config(options.config.as_deref(), Some(&project))?;
    if swiftlint.is_some() {
        config.swiftlint_path = swiftlint;
    }
    run_single(TaskRequest::lint(project), config, options)
}
