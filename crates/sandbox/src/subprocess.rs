// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runs one command to completion, capturing output and enforcing a
//! timeout via a whole-process-group kill.

use std::collections::{HashMap, VecDeque};
use std::os::unix::process::CommandExt as _;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use parking_lot::Mutex;
use taskd_core::ExecutionResult;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{info_span, warn, Instrument};

use crate::SandboxError;

/// Cap on captured stdout/stderr bytes, beyond which older lines are
/// dropped — keeps a runaway print loop from exhausting memory.
const CAPTURE_LIMIT_BYTES: usize = 256 * 1024;

/// Default cap on lines held in a `LiveOutputBuffer`; the chat front-end
/// only ever needs a short tail, not a full transcript.
pub const LIVE_OUTPUT_CAP: usize = 50;

/// Shared sink for streamed output lines, read by the chat front-end
/// while a task is still running. A ring capped at `LIVE_OUTPUT_CAP`:
/// pushing past the cap drops the oldest line.
pub struct LiveOutputBuffer {
    lines: Mutex<VecDeque<String>>,
    cap: usize,
}

impl Default for LiveOutputBuffer {
    fn default() -> Self {
        Self::with_cap(LIVE_OUTPUT_CAP)
    }
}

impl LiveOutputBuffer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_cap(cap: usize) -> Self {
        Self { lines: Mutex::new(VecDeque::with_capacity(cap)), cap }
    }

    fn push(&self, line: String) {
        let mut lines = self.lines.lock();
        if lines.len() >= self.cap {
            lines.pop_front();
        }
        lines.push_back(line);
    }

    /// Every line currently held, in order (at most `cap`).
    pub fn snapshot(&self) -> Vec<String> {
        self.lines.lock().iter().cloned().collect()
    }

    /// The last `n` lines held, in order; fewer if the buffer has fewer.
    pub fn tail(&self, n: usize) -> Vec<String> {
        let lines = self.lines.lock();
        let skip = lines.len().saturating_sub(n);
        lines.iter().skip(skip).cloned().collect()
    }
}

/// A capped ring of captured output: keeps the most recent bytes, so a
/// noisy process's traceback (always near the end) is never evicted in
/// favor of its startup banner.
struct CappedCapture {
    buf: String,
    limit: usize,
}

impl CappedCapture {
    fn new(limit: usize) -> Self {
        Self { buf: String::new(), limit }
    }

    fn push_line(&mut self, line: &str) {
        self.buf.push_str(line);
        self.buf.push('\n');
        if self.buf.len() > self.limit {
            let excess = self.buf.len() - self.limit;
            // Drop whole lines from the front rather than splitting a
            // multi-byte UTF-8 character.
            let cut = self.buf[excess..].find('\n').map(|i| excess + i + 1).unwrap_or(self.buf.len());
            self.buf.drain(..cut);
        }
    }

    fn into_string(self) -> String {
        self.buf
    }
}

/// Find the last `Traceback` marker in `stderr` and return everything
/// from there to the end; empty if there is none.
pub fn extract_traceback(stderr: &str) -> String {
    match stderr.rfind("Traceback") {
        Some(idx) => stderr[idx..].to_string(),
        None => String::new(),
    }
}

/// Run `program args...` in `cwd` with `env`, streaming each output line
/// to `live` as it arrives. Kills the whole process group with `SIGKILL`
/// if `timeout` elapses before the child exits.
pub async fn run(
    program: &str,
    args: &[String],
    cwd: &Path,
    env: &HashMap<String, String>,
    timeout: Duration,
    live: Option<Arc<LiveOutputBuffer>>,
) -> Result<ExecutionResult, SandboxError> {
    let span = info_span!("sandbox.run", program, cwd = %cwd.display());

    async move {
        let mut command = Command::new(program);
        command.args(args).current_dir(cwd).envs(env).stdin(std::process::Stdio::null());
        command.stdout(std::process::Stdio::piped());
        command.stderr(std::process::Stdio::piped());
        // Own process group, so a timeout kill takes every descendant
        // with it instead of only the direct child.
        command.process_group(0);

        let mut child = command.spawn().map_err(SandboxError::Spawn)?;
        let pid = child.id().ok_or(SandboxError::NoPid)? as i32;

        let stdout = child.stdout.take().ok_or(SandboxError::NoPid)?;
        let stderr = child.stderr.take().ok_or(SandboxError::NoPid)?;

        let mut stdout_capture = CappedCapture::new(CAPTURE_LIMIT_BYTES);
        let mut stderr_capture = CappedCapture::new(CAPTURE_LIMIT_BYTES);

        let stdout_live = live.clone();
        let stderr_live = live.clone();

        let stdout_task = tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            let mut captured = Vec::new();
            while let Ok(Some(line)) = lines.next_line().await {
                if let Some(live) = &stdout_live {
                    live.push(line.clone());
                }
                captured.push(line);
            }
            captured
        });
        let stderr_task = tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            let mut captured = Vec::new();
            while let Ok(Some(line)) = lines.next_line().await {
                if let Some(live) = &stderr_live {
                    live.push(line.clone());
                }
                captured.push(line);
            }
            captured
        });

        let wait_result = tokio::time::timeout(timeout, child.wait()).await;

        match wait_result {
            Ok(status_result) => {
                let status = status_result.map_err(SandboxError::Spawn)?;
                for line in stdout_task.await.unwrap_or_default() {
                    stdout_capture.push_line(&line);
                }
                for line in stderr_task.await.unwrap_or_default() {
                    stderr_capture.push_line(&line);
                }
                let stdout_text = stdout_capture.into_string();
                let stderr_text = stderr_capture.into_string();

                if status.success() {
                    Ok(ExecutionResult::ok(stdout_text, stderr_text, Vec::new()))
                } else {
                    let traceback = extract_traceback(&stderr_text);
                    Ok(ExecutionResult::failed(status.code(), stdout_text, stderr_text, traceback))
                }
            }
            Err(_elapsed) => {
                warn!(pid, timeout_secs = timeout.as_secs(), "sandbox run timed out, killing process group");
                let _ = killpg(Pid::from_raw(pid), Signal::SIGKILL);
                let _ = child.wait().await;
                stdout_task.abort();
                stderr_task.abort();
                Ok(ExecutionResult::timed_out(format!("process group {pid} killed after {:?}", timeout)))
            }
        }
    }
    .instrument(span)
    .await
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
