//! Subprocess executor with timeout, output capture and truncation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{self, Read, Write};
use std::process::{Child, Command, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Default timeout for a single command in seconds.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 15;

/// Default stdout cap in characters.
pub const DEFAULT_MAX_STDOUT_CHARS: usize = 4000;

/// Default stderr cap in characters.
pub const DEFAULT_MAX_STDERR_CHARS: usize = 2000;

/// Appended to output that was cut at its cap.
pub const TRUNCATION_MARKER: &str = "\n... (truncated)";

/// Limits applied to one execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecLimits {
    pub timeout: Duration,
    pub max_stdout_chars: usize,
    pub max_stderr_chars: usize,
}

impl Default for ExecLimits {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
            max_stdout_chars: DEFAULT_MAX_STDOUT_CHARS,
            max_stderr_chars: DEFAULT_MAX_STDERR_CHARS,
        }
    }
}

impl ExecLimits {
    /// Default caps with a custom timeout.
    pub fn with_timeout_secs(timeout_seconds: u64) -> Self {
        Self {
            timeout: Duration::from_secs(timeout_seconds),
            ..Self::default()
        }
    }
}

/// Result of executing one command.
///
/// `exit_code` is -1 whenever the command timed out, could not be spawned,
/// or was terminated by a signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub duration_seconds: f64,
    pub truncated: bool,
    pub timed_out: bool,
}

impl ExecutionResult {
    /// Check if the command ran to completion with exit code 0.
    pub fn is_success(&self) -> bool {
        !self.timed_out && self.exit_code == 0
    }

    /// A failed execution that never produced output.
    pub fn error(message: impl Into<String>, started: Instant) -> Self {
        Self {
            exit_code: -1,
            stdout: String::new(),
            stderr: message.into(),
            duration_seconds: elapsed_seconds(started),
            truncated: false,
            timed_out: false,
        }
    }
}

/// Execute a command under the given limits.
///
/// The command is split with shell-words and spawned directly, without a
/// shell, so `;`, `|` and `&&` are passed through as plain arguments.
///
/// This function does not return errors: spawn failures, parse failures and
/// timeouts are all reported inside the [`ExecutionResult`].
pub fn execute(command: &str, limits: &ExecLimits) -> ExecutionResult {
    let started = Instant::now();

    match shell_words::split(command) {
        Ok(args) => run_process(&args, None, &HashMap::new(), limits),
        Err(e) => ExecutionResult::error(
            format!("Execution error: failed to parse command '{}': {}", command, e),
            started,
        ),
    }
}

/// Run an already-tokenized command, optionally feeding `input` on stdin and
/// merging `environment` into the child's environment.
pub fn run_process(
    args: &[String],
    input: Option<&str>,
    environment: &HashMap<String, String>,
    limits: &ExecLimits,
) -> ExecutionResult {
    let started = Instant::now();

    let Some((program, rest)) = args.split_first() else {
        return ExecutionResult::error("Execution error: command is empty", started);
    };

    let mut command = Command::new(program);
    command
        .args(rest)
        .envs(environment)
        .stdin(if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) => {
            return ExecutionResult::error(
                format!("Execution error: failed to execute '{}': {}", program, e),
                started,
            );
        }
    };

    // Feed stdin and drain both pipes concurrently so a chatty child cannot
    // fill a pipe buffer and block forever.
    if let (Some(mut stdin), Some(input)) = (child.stdin.take(), input) {
        let input = input.to_string();
        std::thread::spawn(move || {
            let _ = stdin.write_all(input.as_bytes());
        });
    }
    let stdout_reader = spawn_reader(child.stdout.take(), byte_budget(limits.max_stdout_chars));
    let stderr_reader = spawn_reader(child.stderr.take(), byte_budget(limits.max_stderr_chars));

    match wait_with_timeout(&mut child, limits.timeout) {
        Ok(Some(code)) => {
            let stdout = join_reader(stdout_reader);
            let stderr = join_reader(stderr_reader);
            let (stdout, stdout_cut) = truncate_output(&stdout, limits.max_stdout_chars);
            let (stderr, stderr_cut) = truncate_output(&stderr, limits.max_stderr_chars);

            debug!(program = %program, exit_code = code, "process finished");
            ExecutionResult {
                exit_code: code,
                stdout,
                stderr,
                duration_seconds: elapsed_seconds(started),
                truncated: stdout_cut || stderr_cut,
                timed_out: false,
            }
        }
        Ok(None) => {
            // Readers are left detached: a grandchild may still hold the pipes.
            warn!(program = %program, timeout = ?limits.timeout, "process timed out");
            ExecutionResult {
                exit_code: -1,
                stdout: String::new(),
                stderr: format!("Command timed out after {}", format_timeout(limits.timeout)),
                duration_seconds: elapsed_seconds(started),
                truncated: false,
                timed_out: true,
            }
        }
        Err(e) => {
            kill_process(&mut child);
            ExecutionResult::error(
                format!("Execution error: failed to check process status: {}", e),
                started,
            )
        }
    }
}

/// Wait for a child process with timeout.
///
/// Returns `Some(exit_code)` on exit (-1 when killed by a signal) and `None`
/// when the timeout expired and the child was killed.
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> std::io::Result<Option<i32>> {
    let start = Instant::now();
    let poll_interval = Duration::from_millis(20);

    loop {
        match child.try_wait()? {
            Some(status) => return Ok(Some(status.code().unwrap_or(-1))),
            None => {
                if start.elapsed() >= timeout {
                    kill_process(child);
                    return Ok(None);
                }
                std::thread::sleep(poll_interval);
            }
        }
    }
}

/// Kill a process and reap it.
fn kill_process(child: &mut Child) {
    // On Unix this is SIGKILL; on Windows it is TerminateProcess.
    let _ = child.kill();
    let _ = child.wait();
}

/// Bytes kept per stream: enough for `max_chars` characters of UTF-8 plus
/// one more, so a cut stream still exceeds its cap and gets marked.
fn byte_budget(max_chars: usize) -> u64 {
    (max_chars as u64).saturating_mul(4).saturating_add(4)
}

fn spawn_reader<R: Read + Send + 'static>(
    pipe: Option<R>,
    budget: u64,
) -> Option<JoinHandle<Vec<u8>>> {
    pipe.map(|pipe| std::thread::spawn(move || read_capped(pipe, budget).0))
}

/// Read up to `budget` bytes, then discard the rest of the stream so the
/// writer never blocks on a full pipe.
///
/// Returns the kept bytes and the number of bytes discarded.
fn read_capped<R: Read>(mut pipe: R, budget: u64) -> (Vec<u8>, u64) {
    let mut buf = Vec::new();
    let _ = pipe.by_ref().take(budget).read_to_end(&mut buf);
    let discarded = io::copy(&mut pipe, &mut io::sink()).unwrap_or(0);
    (buf, discarded)
}

/// Render a timeout for messages: whole seconds when exact, else milliseconds.
pub(crate) fn format_timeout(timeout: Duration) -> String {
    if timeout.subsec_nanos() == 0 {
        format!("{}s", timeout.as_secs())
    } else {
        format!("{}ms", timeout.as_millis())
    }
}

fn join_reader(reader: Option<JoinHandle<Vec<u8>>>) -> String {
    reader
        .and_then(|handle| handle.join().ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

/// Cut `text` to at most `max_chars` characters, appending the truncation
/// marker when anything was removed.
///
/// Returns the (possibly truncated) text and whether it was cut.
pub fn truncate_output(text: &str, max_chars: usize) -> (String, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => (format!("{}{}", &text[..byte_idx], TRUNCATION_MARKER), true),
        None => (text.to_string(), false),
    }
}

/// Elapsed wall-clock seconds, rounded to hundredths.
fn elapsed_seconds(started: Instant) -> f64 {
    (started.elapsed().as_secs_f64() * 100.0).round() / 100.0
}
