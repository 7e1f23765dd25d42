//! Configuration for triage runs
//!
//! Values come from `triage.toml` in the project directory (or an explicit path), with
//! every field optional. CLI flags are layered on top by the caller.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File name looked up next to the project
pub const CONFIG_FILE_NAME: &str = "triage.toml";

/// Default attempt budget for a test task
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default number of tasks run side by side
pub const DEFAULT_CONCURRENCY: usize = 2;

/// Default timeout for one external build+test run (30 minutes)
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(1800);

/// Default simulator destination
pub const DEFAULT_DESTINATION: &str = "platform=iOS Simulator,name=iPhone 15";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TriageConfig {
    /// Maximum build+test attempts per task
    pub max_attempts: u32,
    /// Worker pool size
    pub concurrency: usize,
    /// Overall timeout for one external run, in seconds
    pub command_timeout_secs: u64,
    /// Backoff before the second attempt; doubles each retry. 0 disables backoff
    pub backoff_base_secs: u64,
    pub backoff_max_secs: u64,
    /// xcodebuild `-destination` value
    pub destination: String,
    /// Where attempt directories are created
    pub artifacts_dir: Option<PathBuf>,
    /// Commit the working tree after a passing attempt
    pub checkpoint_on_pass: bool,
    /// Explicit lint binary; otherwise looked up on PATH
    pub swiftlint_path: Option<PathBuf>,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            concurrency: DEFAULT_CONCURRENCY,
            command_timeout_secs: DEFAULT_COMMAND_TIMEOUT.as_secs(),
            backoff_base_secs: 0,
            backoff_max_secs: 60,
            destination: DEFAULT_DESTINATION.to_string(),
            artifacts_dir: None,
            checkpoint_on_pass: false,
            swiftlint_path: None,
        }
    }
}

impl TriageConfig {
    /// Load from an explicit file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Load `triage.toml` from `dir` if present, defaults otherwise.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(&path)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: TriageConfig = toml::from_str(content)?;
        Ok(config.normalized())
    }

    /// Clamp values that would make the runner do nothing.
    pub fn normalized(mut self) -> Self {
        self.max_attempts = self.max_attempts.max(1);
        self.concurrency = self.concurrency.max(1);
        self.command_timeout_secs = self.command_timeout_secs.max(1);
        self
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    /// Directory under which attempt directories are created.
    ///
    /// Falls back to the platform cache dir, then the system temp dir.
    pub fn artifacts_root(&self) -> PathBuf {
        self.artifacts_dir
            .clone()
            .or_else(|| dirs::cache_dir().map(|dir| dir.join("triage").join("attempts")))
            .unwrap_or_else(|| std::env::temp_dir().join("triage-attempts"))
    }
}
