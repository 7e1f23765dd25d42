//! One build+test attempt

use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::artifacts::AttemptDir;
use super::build_errors::{build_failed, collect_build_errors};
use super::checkpoint::{Checkpoint, GitCheckpoint, NoCheckpoint};
use super::executor::CommandRunner;
use super::project::{TestInvocation, XcodeProject};
use crate::config::TriageConfig;
use crate::error::TriageError;
use crate::models::{AttemptOutcome, RunArtifacts, RunResult};
use crate::pipeline::interpret_result_bundle;
use crate::tree::ResultStore;

/// What to build and test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptOptions {
    /// `.xcodeproj`, `.xcworkspace`, or a directory holding exactly one of them
    pub project: PathBuf,
    pub scheme: String,
    /// Overrides the configured destination
    pub destination: Option<String>,
    pub only_testing: Vec<String>,
}

impl AttemptOptions {
    pub fn new(project: impl Into<PathBuf>, scheme: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            scheme: scheme.into(),
            destination: None,
            only_testing: Vec::new(),
        }
    }
}

/// Drives attempts against the external tools.
///
/// Holds no state between attempts; every call gets its own artifact directory.
pub struct Orchestrator {
    runner: Arc<dyn CommandRunner>,
    store: Arc<dyn ResultStore>,
    checkpoint: Arc<dyn Checkpoint>,
    config: TriageConfig,
}

impl Orchestrator {
    /// Checkpointing follows `config.checkpoint_on_pass`.
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        store: Arc<dyn ResultStore>,
        config: TriageConfig,
    ) -> Self {
        let checkpoint: Arc<dyn Checkpoint> = if config.checkpoint_on_pass {
            Arc::new(GitCheckpoint::new(runner.clone()))
        } else {
            Arc::new(NoCheckpoint)
        };
        Self {
            runner,
            store,
            checkpoint,
            config,
        }
    }

    pub fn with_checkpoint(mut self, checkpoint: Arc<dyn Checkpoint>) -> Self {
        self.checkpoint = checkpoint;
        self
    }

    pub fn config(&self) -> &TriageConfig {
        &self.config
    }

    /// Run one build+test attempt.
    ///
    /// `Ok` covers passed, build-failed and tests-failed runs. `Err` is reserved for
    /// system errors: missing project, spawn failure, timeout.
    pub fn attempt(&self, options: &AttemptOptions, attempt: u32) -> Result<RunResult, TriageError> {
        let project = XcodeProject::resolve(&options.project)?;
        let dir = AttemptDir::create(&self.config.artifacts_root(), attempt)?;

        let destination = options
            .destination
            .clone()
            .unwrap_or_else(|| self.config.destination.clone());
        let invocation = TestInvocation::new(project.clone(), &options.scheme, dir.result_bundle())
            .with_destination(destination)
            .with_only_testing(options.only_testing.clone());
        let command = invocation.command_line();

        info!(attempt, scheme = %options.scheme, "starting attempt");
        debug!(%command, dir = %dir.path().display(), "attempt command");

        let output = self
            .runner
            .run(&command, Some(project.root()), self.config.command_timeout())?;
        let logs = dir.write_logs(&output);
        let bundle = dir.result_bundle();
        let has_bundle = bundle.exists();

        let mut run = if build_failed(&output) || (!has_bundle && !output.success()) {
            RunResult::build_failed(attempt, collect_build_errors(&output))
        } else {
            let failures = interpret_result_bundle(self.store.as_ref(), &bundle, project.root());
            if failures.is_empty() && !output.success() {
                // Non-zero exit but nothing readable in the bundle
                RunResult::build_failed(attempt, collect_build_errors(&output))
            } else {
                RunResult::tested(attempt, failures)
            }
        };
        run.artifacts = Some(RunArtifacts {
            result_bundle: has_bundle.then_some(bundle),
            logs,
        });

        let outcome = run.outcome();
        info!(
            attempt,
            ?outcome,
            build_errors = run.build_errors.len(),
            failures = run.failures.len(),
            duration_ms = output.duration.as_millis() as u64,
            "attempt finished"
        );

        if outcome == AttemptOutcome::Passed {
            let message = format!("triage: {} passing (attempt {attempt})", options.scheme);
            if let Err(e) = self.checkpoint.checkpoint(project.root(), &message) {
                warn!(error = %e, "checkpoint failed, keeping passing result");
            }
        }

        dir.cleanup();
        Ok(run)
    }
}
