//! `triage test`: build and test a scheme, retrying failures

use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

use super::{load_config, run_single, GlobalOptions};
use crate::task::TaskRequest;

/// Arguments of the test command
#[derive(Debug, Clone)]
pub struct TestArgs {
    pub project: PathBuf,
    pub scheme: String,
    pub destination: Option<String>,
    pub only_testing: Vec<String>,
    pub max_attempts: Option<u32>,
}

/// Execute the test command
pub fn execute(args: TestArgs, options: &GlobalOptions) -> Result<bool> {
    let config = load_config(options.config.as_deref(), Some(&args.project))?;

    let mut request = TaskRequest::test(args.project, args.scheme);
    request.destination = args.destination;
    request.only_testing = args.only_testing;
    request.max_attempts = args.max_attempts;

    if !options.json {
        let attempts = request.max_attempts.unwrap_or(config.max_attempts);
        eprintln!(
            "{} Testing scheme '{}' (up to {attempts} attempt(s))...",
            "→".cyan().bold(),
            request.scheme.as_deref().unwrap_or_default()
        );
    }
    run_single(request, config, options)
}
