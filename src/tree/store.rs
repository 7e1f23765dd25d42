//! Access to result-tree objects

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::runner::executor::CommandRunner;

/// Default time allowed for a single object lookup
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(120);

/// Returns a parsed object tree (or subtree) of a result artifact.
///
/// `node_id = None` means the root object.
pub trait ResultStore: Send + Sync {
    fn get_object(&self, artifact: &Path, node_id: Option<&str>) -> Result<Value>;
}

/// Reads objects out of an `.xcresult` bundle through `xcresulttool`.
pub struct XcresultTool {
    runner: Arc<dyn CommandRunner>,
    timeout: Duration,
}

impl XcresultTool {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn command(artifact: &Path, node_id: Option<&str>) -> String {
        let path = artifact.display().to_string();
        let mut command = format!(
            "xcrun xcresulttool get --legacy --format json --path {}",
            shell_escape::escape(path.into())
        );
        if let Some(id) = node_id {
            command.push_str(" --id ");
            command.push_str(&shell_escape::escape(id.into()));
        }
        command
    }
}

impl ResultStore for XcresultTool {
    fn get_object(&self, artifact: &Path, node_id: Option<&str>) -> Result<Value> {
        let command = Self::command(artifact, node_id);
        let output = self
            .runner
            .run(&command, None, self.timeout)
            .with_context(|| format!("Failed to query result bundle: {}", artifact.display()))?;

        if !output.success() {
            bail!(
                "xcresulttool exited with {:?}: {}",
                output.exit_code,
                output.stderr.trim()
            );
        }

        serde_json::from_str(&output.stdout).context("Failed to parse xcresulttool JSON output")
    }
}

/// Serves objects previously exported to a directory: `root.json` for the root and
/// `<node id>.json` for every other node.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportedStore;

impl ExportedStore {
    /// Whether `dir` looks like an exported result tree
    pub fn is_export(dir: &Path) -> bool {
        dir.join("root.json").is_file()
    }
}

impl ResultStore for ExportedStore {
    fn get_object(&self, artifact: &Path, node_id: Option<&str>) -> Result<Value> {
        let file_name = match node_id {
            Some(id) => format!("{}.json", id.replace(['/', '\\'], "_")),
            None => "root.json".to_string(),
        };
        let path = artifact.join(file_name);
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read exported object: {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse exported object: {}", path.display()))
    }
}

/// Reads exported directories directly and everything else through `xcresulttool`.
pub struct AutoStore {
    tool: XcresultTool,
}

impl AutoStore {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            tool: XcresultTool::new(runner),
        }
    }
}

impl ResultStore for AutoStore {
    fn get_object(&self, artifact: &Path, node_id: Option<&str>) -> Result<Value> {
        if ExportedStore::is_export(artifact) {
            ExportedStore.get_object(artifact, node_id)
        } else {
            self.tool.get_object(artifact, node_id)
        }
    }
}
