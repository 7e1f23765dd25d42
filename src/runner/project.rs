//! Project resolution and the xcodebuild test invocation

use glob::glob;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::DEFAULT_DESTINATION;
use crate::error::TriageError;

/// Kind of Xcode container a path points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectKind {
    Project,
    Workspace,
}

impl ProjectKind {
    fn flag(self) -> &'static str {
        match self {
            ProjectKind::Project => "-project",
            ProjectKind::Workspace => "-workspace",
        }
    }
}

/// A resolved `.xcodeproj` or `.xcworkspace`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XcodeProject {
    pub path: PathBuf,
    pub kind: ProjectKind,
}

impl XcodeProject {
    /// Resolve `path` to a project container.
    ///
    /// A path ending in `.xcodeproj`/`.xcworkspace` is taken as is. Any other directory
    /// is searched (non-recursively) for exactly one workspace, else exactly one project.
    pub fn resolve(path: &Path) -> Result<Self, TriageError> {
        if !path.exists() {
            return Err(TriageError::MissingProject {
                path: path.to_path_buf(),
            });
        }

        if let Some(kind) = kind_of(path) {
            return Ok(Self {
                path: path.to_path_buf(),
                kind,
            });
        }

        if path.is_dir() {
            for (pattern, kind) in [
                ("*.xcworkspace", ProjectKind::Workspace),
                ("*.xcodeproj", ProjectKind::Project),
            ] {
                let found = find_single(path, pattern);
                if let Some(found) = found {
                    debug!(path = %found.display(), "resolved project");
                    return Ok(Self { path: found, kind });
                }
            }
        }

        Err(TriageError::MissingProject {
            path: path.to_path_buf(),
        })
    }

    /// Directory containing the project, used as the root for relative source paths
    pub fn root(&self) -> &Path {
        parent_dir(&self.path)
    }
}

/// Directory holding `path`. A bare file name lives in `.`, never in the empty path.
pub fn parent_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

fn kind_of(path: &Path) -> Option<ProjectKind> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("xcodeproj") => Some(ProjectKind::Project),
        Some("xcworkspace") => Some(ProjectKind::Workspace),
        _ => None,
    }
}

/// The only match of `pattern` in `dir`. Ambiguous or empty matches yield `None`.
fn find_single(dir: &Path, pattern: &str) -> Option<PathBuf> {
    let full_pattern = dir.join(pattern);
    let matches: Vec<PathBuf> = glob(&full_pattern.to_string_lossy())
        .ok()?
        .filter_map(|entry| entry.ok())
        .collect();

    match matches.as_slice() {
        [single] => Some(single.clone()),
        _ => None,
    }
}

/// Parameters of one `xcodebuild test` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestInvocation {
    pub project: XcodeProject,
    pub scheme: String,
    pub destination: String,
    pub result_bundle: PathBuf,
    /// `-only-testing:` selectors; empty runs everything in the scheme
    pub only_testing: Vec<String>,
}

impl TestInvocation {
    pub fn new(project: XcodeProject, scheme: impl Into<String>, result_bundle: PathBuf) -> Self {
        Self {
            project,
            scheme: scheme.into(),
            destination: DEFAULT_DESTINATION.to_string(),
            result_bundle,
            only_testing: Vec::new(),
        }
    }

    pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = destination.into();
        self
    }

    pub fn with_only_testing(mut self, tests: Vec<String>) -> Self {
        self.only_testing = tests;
        self
    }

    /// Shell command line with every argument escaped.
    pub fn command_line(&self) -> String {
        let mut args = vec![
            "xcodebuild".to_string(),
            "test".to_string(),
            self.project.kind.flag().to_string(),
            escape(&self.project.path.display().to_string()),
            "-scheme".to_string(),
            escape(&self.scheme),
            "-destination".to_string(),
            escape(&self.destination),
            "-resultBundlePath".to_string(),
            escape(&self.result_bundle.display().to_string()),
        ];
        for test in &self.only_testing {
            args.push(escape(&format!("-only-testing:{test}")));
        }
        args.join(" ")
    }
}

fn escape(value: &str) -> String {
    shell_escape::escape(value.to_string().into()).into_owned()
}
