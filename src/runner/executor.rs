//! Shell command execution with captured output and a hard timeout

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;
use wait_timeout::ChildExt;

use crate::error::TriageError;

/// Timeout for collecting output from child process pipes
const OUTPUT_COLLECTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum captured output per stream (32MB). xcodebuild logs are large.
const MAX_OUTPUT_SIZE: usize = 32 * 1024 * 1024;

/// Captured result of one external command.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    pub duration: Duration,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// stdout followed by stderr, for pattern scanning
    pub fn combined(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }
}

/// Runs an external command and hands back whatever it printed.
///
/// A non-zero exit is not an error. Only spawn-level failures and timeouts are.
pub trait CommandRunner: Send + Sync {
    fn run(
        &self,
        command: &str,
        working_dir: Option<&Path>,
        timeout: Duration,
    ) -> Result<CommandOutput, TriageError>;
}

/// `CommandRunner` backed by `sh -c` (or `cmd /C` on Windows).
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellRunner;

impl CommandRunner for ShellRunner {
    fn run(
        &self,
        command: &str,
        working_dir: Option<&Path>,
        timeout: Duration,
    ) -> Result<CommandOutput, TriageError> {
        run_command_with_timeout(command, working_dir, timeout)
    }
}

/// Run a shell command, capturing stdout/stderr, killing it after `timeout`.
pub fn run_command_with_timeout(
    command: &str,
    working_dir: Option<&Path>,
    timeout: Duration,
) -> Result<CommandOutput, TriageError> {
    let start = Instant::now();
    debug!(command, ?working_dir, "spawning command");

    let mut child = spawn_shell_command(command, working_dir)?;

    // Drain both pipes while waiting, otherwise a chatty child blocks on a full pipe buffer.
    let stdout_rx = drain_in_background(child.stdout.take());
    let stderr_rx = drain_in_background(child.stderr.take());

    let wait_result = child.wait_timeout(timeout)?;
    let duration = start.elapsed();

    match wait_result {
        Some(status) => {
            let stdout = collect(stdout_rx);
            let stderr = collect(stderr_rx);
            debug!(command, exit_code = ?status.code(), ?duration, "command finished");
            Ok(CommandOutput {
                stdout,
                stderr,
                exit_code: status.code(),
                duration,
            })
        }
        None => {
            kill_child_process(&mut child);
            Err(TriageError::Timeout {
                command: command.to_string(),
                timeout,
            })
        }
    }
}

fn spawn_shell_command(command: &str, working_dir: Option<&Path>) -> Result<Child, TriageError> {
    let mut cmd = if cfg!(target_family = "unix") {
        let mut c = Command::new("sh");
        c.arg("-c").arg(command);
        c
    } else {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(command);
        c
    };

    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    if let Some(dir) = working_dir {
        cmd.current_dir(dir);
    }

    cmd.spawn().map_err(|source| TriageError::Spawn {
        command: command.to_string(),
        source,
    })
}

fn drain_in_background<R: Read + Send + 'static>(stream: Option<R>) -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    match stream {
        Some(stream) => {
            thread::spawn(move || {
                let _ = tx.send(read_stream_to_string(stream));
            });
        }
        None => {
            let _ = tx.send(String::new());
        }
    }
    rx
}

fn collect(rx: mpsc::Receiver<String>) -> String {
    rx.recv_timeout(OUTPUT_COLLECTION_TIMEOUT)
        .unwrap_or_else(|_| "[output collection timed out]".to_string())
}

/// Read a stream to string, capping at MAX_OUTPUT_SIZE.
///
/// Past the cap the rest of the stream is drained and discarded so the child never sees a
/// broken pipe.
fn read_stream_to_string<R: Read>(mut stream: R) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];

    loop {
        match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                let remaining = MAX_OUTPUT_SIZE.saturating_sub(buf.len());
                let to_copy = n.min(remaining);
                buf.extend_from_slice(&chunk[..to_copy]);
                if to_copy < n {
                    let mut discard = [0u8; 8192];
                    while stream.read(&mut discard).unwrap_or(0) > 0 {}
                    buf.extend_from_slice(b"\n[output truncated at 32MB]");
                    break;
                }
            }
            Err(_) => {
                if buf.is_empty() {
                    return "[error reading output]".to_string();
                }
                break;
            }
        }
    }

    String::from_utf8_lossy(&buf).to_string()
}

fn kill_child_process(child: &mut Child) {
    // The process may already be gone
    let _ = child.kill();
    let _ = child.wait();
}
