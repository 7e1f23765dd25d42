//! Checkpointing a project after a passing attempt

use anyhow::{bail, Context, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use super::executor::CommandRunner;

const GIT_TIMEOUT: Duration = Duration::from_secs(60);

/// Records the state of a project once its tests pass.
pub trait Checkpoint: Send + Sync {
    fn checkpoint(&self, project_dir: &Path, message: &str) -> Result<()>;
}

/// Does nothing. Used when checkpointing is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCheckpoint;

impl Checkpoint for NoCheckpoint {
    fn checkpoint(&self, _project_dir: &Path, _message: &str) -> Result<()> {
        Ok(())
    }
}

/// Stages everything and commits it with git.
pub struct GitCheckpoint {
    runner: Arc<dyn CommandRunner>,
}

impl GitCheckpoint {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

impl Checkpoint for GitCheckpoint {
    fn checkpoint(&self, project_dir: &Path, message: &str) -> Result<()> {
        let command = format!(
            "git add -A && git commit -m {}",
            shell_escape::escape(message.to_string().into())
        );
        let output = self
            .runner
            .run(&command, Some(project_dir), GIT_TIMEOUT)
            .with_context(|| format!("Failed to checkpoint {}", project_dir.display()))?;

        if output.success() || output.combined().contains("nothing to commit") {
            return Ok(());
        }
        bail!("git commit failed: {}", output.stderr.trim());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TriageError;
    use crate::runner::executor::CommandOutput;
    use std::sync::Mutex;

    struct Scripted {
        exit_code: i32,
        stdout: &'static str,
        commands: Mutex<Vec<String>>,
    }

    impl CommandRunner for Scripted {
        fn run(
            &self,
            command: &str,
            _working_dir: Option<&Path>,
            _timeout: Duration,
        ) -> Result<CommandOutput, TriageError> {
            self.commands.lock().unwrap().push(command.to_string());
            Ok(CommandOutput {
                stdout: self.stdout.to_string(),
                exit_code: Some(self.exit_code),
                ..CommandOutput::default()
            })
        }
    }

    fn scripted(exit_code: i32, stdout: &'static str) -> Arc<Scripted> {
        Arc::new(Scripted {
            exit_code,
            stdout,
            commands: Mutex::new(Vec::new()),
        })
    }

    #[test]
    fn test_git_checkpoint_commits() {
        let runner = scripted(0, "");
        let checkpoint = GitCheckpoint::new(runner.clone());
        checkpoint
            .checkpoint(Path::new("/work"), "triage: tests pass")
            .unwrap();

        let commands = runner.commands.lock().unwrap();
        assert_eq!(
            commands[0],
            "git add -A && git commit -m 'triage: tests pass'"
        );
    }

    #[test]
    fn test_clean_tree_is_not_an_error() {
        let checkpoint = GitCheckpoint::new(scripted(1, "nothing to commit, working tree clean"));
        assert!(checkpoint.checkpoint(Path::new("/work"), "msg").is_ok());
    }

    #[test]
    fn test_commit_failure_is_error() {
        let checkpoint = GitCheckpoint::new(scripted(128, ""));
        assert!(checkpoint.checkpoint(Path::new("/work"), "msg").is_err());
    }
}
