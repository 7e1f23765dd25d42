use std::thread;
use std::time::Duration;
use tracing::{info, warn};

use super::attempt::{AttemptOptions, Orchestrator};
use crate::error::ErrorKind;
use crate::models::{AttemptOutcome, RunResult, TaskFailure, TaskResult};

/// What to do after an attempt that left tests failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemediationDecision {
    /// Run another attempt
    Retry,
    /// Stop and ask the caller for more context
    NeedsContext,
    /// Stop and report the failures as they are
    GiveUp,
}

/// Caller-supplied policy consulted between attempts.
///
/// This is the hook where a fixer applies changes before the next attempt runs.
pub trait Remediator: Send + Sync {
    fn decide(&self, run: &RunResult, attempts_left: u32) -> RemediationDecision;
}

/// Retries until the attempt budget runs out. Useful for flaky suites.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysRetry;

impl Remediator for AlwaysRetry {
    fn decide(&self, _run: &RunResult, _attempts_left: u32) -> RemediationDecision {
        RemediationDecision::Retry
    }
}

/// Reports the first set of failures without retrying.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRetry;

impl Remediator for NoRetry {
    fn decide(&self, _run: &RunResult, _attempts_left: u32) -> RemediationDecision {
        RemediationDecision::GiveUp
    }
}

/// Calculates exponential backoff duration before the next attempt.
///
/// Formula: base_secs * 2^(retry_count-1), capped at max_secs
///
/// # Examples
///
/// With base_secs=5, max_secs=60:
/// - Retry 1: 5s
/// - Retry 2: 10s
/// - Retry 3: 20s
/// - Retry 5+: 60s (capped)
pub fn calculate_backoff(retry_count: u32, base_secs: u64, max_secs: u64) -> Duration {
    if retry_count == 0 {
        return Duration::from_secs(0);
    }

    let multiplier = 2u64.saturating_pow(retry_count - 1);
    let backoff_secs = base_secs.saturating_mul(multiplier).min(max_secs);

    Duration::from_secs(backoff_secs)
}

/// Run attempts until tests pass, the build breaks, the remediator stops, or
/// `max_attempts` is reached.
///
/// - system error: its `ErrorKind` from the error text
/// - build failure: `build-error`, never retried
/// - failures on the last attempt: `max-retries` with that attempt's failures
pub fn run_with_retries(
    orchestrator: &Orchestrator,
    options: &AttemptOptions,
    max_attempts: u32,
    remediator: &dyn Remediator,
) -> TaskResult<RunResult> {
    let max_attempts = max_attempts.max(1);
    let config = orchestrator.config();
    let mut attempt = 0;

    loop {
        attempt += 1;
        let run = orchestrator
            .attempt(options, attempt)
            .map_err(|e| {
                warn!(attempt, error = %e, "attempt errored");
                TaskFailure::from(e).with_attempts(attempt)
            })?;

        match run.outcome() {
            AttemptOutcome::Passed => return Ok(run),
            AttemptOutcome::BuildFailed => {
                return Err(TaskFailure::new(
                    ErrorKind::BuildError,
                    format!("build failed on attempt {attempt}"),
                )
                .with_run(&run));
            }
            AttemptOutcome::TestsFailed => {}
        }

        if attempt >= max_attempts {
            return Err(TaskFailure::new(
                ErrorKind::MaxRetries,
                format!(
                    "{} test(s) still failing after {attempt} attempt(s)",
                    run.failures.len()
                ),
            )
            .with_run(&run));
        }

        match remediator.decide(&run, max_attempts - attempt) {
            RemediationDecision::Retry => {}
            RemediationDecision::NeedsContext => {
                return Err(TaskFailure::new(
                    ErrorKind::NeedsContext,
                    format!("remediation needs context after attempt {attempt}"),
                )
                .with_run(&run));
            }
            RemediationDecision::GiveUp => {
                return Err(TaskFailure::new(
                    ErrorKind::TestFailures,
                    format!("{} test(s) failing", run.failures.len()),
                )
                .with_run(&run));
            }
        }

        let backoff = calculate_backoff(attempt, config.backoff_base_secs, config.backoff_max_secs);
        info!(
            attempt,
            failures = run.failures.len(),
            backoff_secs = backoff.as_secs(),
            "retrying"
        );
        if !backoff.is_zero() {
            thread::sleep(backoff);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_backoff() {
        assert_eq!(calculate_backoff(0, 5, 60), Duration::from_secs(0));
        assert_eq!(calculate_backoff(1, 5, 60), Duration::from_secs(5));
        assert_eq!(calculate_backoff(2, 5, 60), Duration::from_secs(10));
        assert_eq!(calculate_backoff(3, 5, 60), Duration::from_secs(20));
        assert_eq!(calculate_backoff(5, 5, 60), Duration::from_secs(60));
        assert_eq!(calculate_backoff(100, 5, 60), Duration::from_secs(60));
    }

    #[test]
    fn test_zero_base_disables_backoff() {
        assert!(calculate_backoff(4, 0, 60).is_zero());
    }

    #[test]
    fn test_builtin_remediators() {
        let run = RunResult::default();
        assert_eq!(AlwaysRetry.decide(&run, 2), RemediationDecision::Retry);
        assert_eq!(NoRetry.decide(&run, 2), RemediationDecision::GiveUp);
    }
}
