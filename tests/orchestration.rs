//! Retry orchestration and batch dispatch against scripted tools

use anyhow::{anyhow, Result};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

use triage::commands::batch::run_batch;
use triage::config::TriageConfig;
use triage::error::{ErrorKind, TriageError};
use triage::report::{Priority, ReportKind};
use triage::runner::{
    run_with_retries, AlwaysRetry, AttemptOptions, CommandOutput, CommandRunner, Orchestrator,
    WorkerPool,
};
use triage::task::TaskContext;
use triage::tree::ResultStore;

/// Pretends to be xcodebuild: every run "fails tests" and writes a result bundle whose
/// content is chosen by the scheme name and the attempt count.
struct ScriptedXcodebuild {
    runs: Mutex<u32>,
}

impl ScriptedXcodebuild {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            runs: Mutex::new(0),
        })
    }
}

fn token_after<'a>(command: &'a str, flag: &str) -> Option<&'a str> {
    let mut tokens = command.split_whitespace();
    tokens.find(|t| *t == flag)?;
    tokens.next()
}

impl CommandRunner for ScriptedXcodebuild {
    fn run(
        &self,
        command: &str,
        _working_dir: Option<&Path>,
        _timeout: Duration,
    ) -> Result<CommandOutput, TriageError> {
        let mut runs = self.runs.lock().unwrap();
        *runs += 1;

        let scheme = token_after(command, "-scheme").unwrap_or_default();
        if scheme == "Broken" {
            return Ok(CommandOutput {
                stdout: "Cart.swift:4:9: error: undefined symbol X\n** TEST BUILD FAILED **".to_string(),
                exit_code: Some(65),
                ..CommandOutput::default()
            });
        }

        let bundle = PathBuf::from(token_after(command, "-resultBundlePath").unwrap());
        fs::create_dir_all(&bundle).unwrap();
        let marker = if scheme == "Green" {
            "pass".to_string()
        } else {
            format!("fail-{}", *runs)
        };
        fs::write(bundle.join("marker"), marker).unwrap();

        Ok(CommandOutput {
            stdout: "** TEST FAILED **".to_string(),
            exit_code: Some(if scheme == "Green" { 0 } else { 65 }),
            ..CommandOutput::default()
        })
    }
}

/// Reads the marker the fake tool left in the bundle and serves a matching tree.
///
/// `fail-N` fails `testA` on every attempt and `testB` only on the first one.
struct MarkerStore {
    trees: Mutex<HashMap<PathBuf, Value>>,
}

impl MarkerStore {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            trees: Mutex::new(HashMap::new()),
        })
    }
}

fn leaf(name: &str, status: &str) -> Value {
    json!({
        "identifier": {"_value": format!("CartTests/{name}()")},
        "testStatus": {"_value": status},
        "failureSummaries": {"_values": [{"message": {"_value": "XCTAssertEqual failed"}}]}
    })
}

impl ResultStore for MarkerStore {
    fn get_object(&self, artifact: &Path, node_id: Option<&str>) -> Result<Value> {
        if node_id.is_some() {
            return Err(anyhow!("no nodes"));
        }
        let mut trees = self.trees.lock().unwrap();
        if let Some(tree) = trees.get(artifact) {
            return Ok(tree.clone());
        }
        let marker = fs::read_to_string(artifact.join("marker"))?;
        let tree = match marker.as_str() {
            "pass" => json!({"name": {"_value": "CartTests"}, "subtests": {"_values": [leaf("testA", "Success")]}}),
            "fail-1" => json!({"name": {"_value": "CartTests"}, "subtests": {"_values": [
                leaf("testA", "Failure"),
                leaf("testB", "Failure"),
            ]}}),
            _ => json!({"name": {"_value": "CartTests"}, "subtests": {"_values": [
                leaf("testA", "Failure"),
                leaf("testB", "Success"),
            ]}}),
        };
        trees.insert(artifact.to_path_buf(), tree.clone());
        Ok(tree)
    }
}

fn workspace() -> (TempDir, PathBuf, TriageConfig) {
    let temp = TempDir::new().unwrap();
    let project = temp.path().join("Shop");
    fs::create_dir_all(project.join("Shop.xcodeproj")).unwrap();
    let config = TriageConfig {
        artifacts_dir: Some(temp.path().join("attempts")),
        max_attempts: 3,
        ..TriageConfig::default()
    };
    (temp, project, config)
}

#[test]
fn max_retries_reports_last_attempt_failures() {
    let (_temp, project, config) = workspace();
    let runner = ScriptedXcodebuild::new();
    let orchestrator = Orchestrator::new(runner.clone(), MarkerStore::new(), config);
    let options = AttemptOptions::new(&project, "Shop");

    let failure = run_with_retries(&orchestrator, &options, 3, &AlwaysRetry).unwrap_err();

    assert_eq!(failure.kind, ErrorKind::MaxRetries);
    assert_eq!(failure.attempts, 3);
    assert_eq!(*runner.runs.lock().unwrap(), 3);
    let ids: Vec<&str> = failure.failures.iter().map(|f| f.identifier.as_str()).collect();
    assert_eq!(ids, vec!["CartTests/testA()"]);
}

#[test]
fn every_attempt_directory_is_cleaned_up() {
    let (_temp, project, config) = workspace();
    let root = config.artifacts_root();
    let orchestrator = Orchestrator::new(ScriptedXcodebuild::new(), MarkerStore::new(), config);

    let _ = run_with_retries(&orchestrator, &AttemptOptions::new(&project, "Shop"), 3, &AlwaysRetry);
    assert_eq!(fs::read_dir(root).unwrap().count(), 0);
}

fn batch_context(config: TriageConfig) -> Arc<TaskContext> {
    Arc::new(TaskContext::new(
        ScriptedXcodebuild::new(),
        MarkerStore::new(),
        Arc::new(AlwaysRetry),
        config,
    ))
}

#[test]
fn batch_reports_come_back_in_request_order() {
    let (_temp, project, config) = workspace();
    let project = project.display().to_string();
    let requests = vec![
        json!({"type": "test", "project": project, "scheme": "Green"}),
        json!({"type": "test", "project": project, "scheme": "Broken"}),
        json!({"type": "test", "project": project, "scheme": "Shop", "maxAttempts": 2}),
        json!({"type": "deploy"}),
        json!({"type": "test", "project": project}),
        json!({"scheme": 7}),
    ];

    let pool = WorkerPool::new(2);
    let reports = run_batch(requests, batch_context(config), &pool);
    assert_eq!(reports.len(), 6);

    let green = &reports[0].structured;
    assert_eq!(green.report_type, ReportKind::Success);
    assert_eq!(green.priority, Priority::AllGood);

    let broken = &reports[1].structured;
    assert_eq!(broken.report_type, ReportKind::BuildError);
    assert_eq!(broken.priority, Priority::FixBuild);
    assert_eq!(broken.build_errors, vec!["Cart.swift:4:9: error: undefined symbol X"]);

    let flaky = &reports[2].structured;
    assert_eq!(flaky.kind, Some(ErrorKind::MaxRetries));
    assert_eq!(flaky.report_type, ReportKind::TestFailures);
    assert_eq!(flaky.priority, Priority::FixTests);
    assert_eq!(flaky.attempts, 2);

    assert_eq!(reports[3].structured.kind, Some(ErrorKind::UnknownTaskType));
    assert_eq!(reports[4].structured.report_type, ReportKind::InvalidInput);
    assert_eq!(reports[5].structured.report_type, ReportKind::InvalidInput);
    assert_eq!(reports[5].structured.input, json!({"scheme": 7}));
}
