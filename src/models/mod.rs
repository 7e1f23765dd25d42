pub mod failure;
pub mod run;
pub mod task;

pub use failure::{FailureCategory, FailureRecord, Severity, SourceContext};
pub use run::{AttemptOutcome, RunArtifacts, RunResult};
pub use task::{task_result_to_json, TaskFailure, TaskOutput, TaskResult};
