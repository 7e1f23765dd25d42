//! `triage analyze`: interpret an existing result bundle without running anything

use anyhow::Result;
use std::path::PathBuf;

use super::{load_config, run_single, GlobalOptions};
use crate::task::TaskRequest;

/// Execute the analyze command
pub fn execute(bundle: PathBuf, project_root: Option<PathBuf>, options: &GlobalOptions) -> Result<bool> {
    let config = load_config(options.config.as_deref(), project_root.as_deref())?;
    run_single(TaskRequest::analyze(bundle, project_root), config, options)
}
