//! Per-attempt artifact directories

use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

use super::executor::CommandOutput;
use crate::error::TriageError;

/// Isolated working directory for one attempt.
///
/// Named `attempt-<timestamp>-<n>-<random>` so concurrent attempts never collide. The
/// directory and everything in it is removed when this value is dropped, on every exit
/// path.
#[derive(Debug)]
pub struct AttemptDir {
    dir: TempDir,
}

impl AttemptDir {
    pub fn create(root: &Path, attempt: u32) -> Result<Self, TriageError> {
        fs::create_dir_all(root)?;
        let prefix = format!(
            "attempt-{}-{attempt}-",
            Utc::now().format("%Y%m%dT%H%M%S%3f")
        );
        let dir = tempfile::Builder::new()
            .prefix(&prefix)
            .rand_bytes(6)
            .tempdir_in(root)?;
        debug!(path = %dir.path().display(), "created attempt directory");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Where the test runner is told to write its result bundle
    pub fn result_bundle(&self) -> PathBuf {
        self.path().join("result.xcresult")
    }

    /// Write captured stdout/stderr next to the bundle. Best effort.
    pub fn write_logs(&self, output: &CommandOutput) -> Vec<PathBuf> {
        let mut written = Vec::new();
        for (name, content) in [("stdout.log", &output.stdout), ("stderr.log", &output.stderr)] {
            let path = self.path().join(name);
            match fs::write(&path, content) {
                Ok(()) => written.push(path),
                Err(e) => warn!(path = %path.display(), error = %e, "could not write log"),
            }
        }
        written
    }

    /// Remove the directory now, logging instead of failing if that does not work.
    pub fn cleanup(self) {
        let path = self.path().to_path_buf();
        if let Err(e) = self.dir.close() {
            warn!(path = %path.display(), error = %e, "could not remove attempt directory");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attempt_dirs_are_unique_and_removed() {
        let root = TempDir::new().unwrap();

        let first = AttemptDir::create(root.path(), 1).unwrap();
        let second = AttemptDir::create(root.path(), 1).unwrap();
        assert_ne!(first.path(), second.path());

        let name = first.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("attempt-"));

        let first_path = first.path().to_path_buf();
        let second_path = second.path().to_path_buf();
        first.cleanup();
        drop(second);

        assert!(!first_path.exists());
        assert!(!second_path.exists());
    }

    #[test]
    fn test_write_logs() {
        let root = TempDir::new().unwrap();
        let dir = AttemptDir::create(&root.path().join("nested"), 2).unwrap();
        let output = CommandOutput {
            stdout: "out".to_string(),
            stderr: "err".to_string(),
            ..CommandOutput::default()
        };

        let logs = dir.write_logs(&output);
        assert_eq!(logs.len(), 2);
        assert_eq!(fs::read_to_string(&logs[0]).unwrap(), "out");
        assert_eq!(fs::read_to_string(&logs[1]).unwrap(), "err");
        assert!(dir.result_bundle().ends_with("result.xcresult"));
    }
}
