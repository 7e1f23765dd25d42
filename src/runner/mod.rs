//! Run orchestration: executing the external build+test, retrying, scheduling

pub mod artifacts;
pub mod attempt;
pub mod build_errors;
pub mod checkpoint;
pub mod executor;
pub mod pool;
pub mod project;
pub mod retry;


pub use artifacts::AttemptDir;
pub use attempt::{AttemptOptions, Orchestrator};
pub use build_errors::{build_failed, collect_build_errors, extract_error_lines};
pub use checkpoint::{Checkpoint, GitCheckpoint, NoCheckpoint};
pub use executor::{run_command_with_timeout, CommandOutput, CommandRunner, ShellRunner};
pub use pool::{JobHandle, WorkerPool};
pub use project::{parent_dir, ProjectKind, TestInvocation, XcodeProject};
pub use retry::{
    calculate_backoff, run_with_retries, AlwaysRetry, NoRetry, RemediationDecision, Remediator,
};
