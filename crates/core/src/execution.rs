// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The outcome of a single sandbox run.

use serde::{Deserialize, Serialize};

/// Result of running a generated script or shell command in the sandbox.
///
/// One value covers both the happy path and the auto-install retry loop:
/// `auto_installed` lists the packages the sandbox installed before the
/// run that finally produced this result, so the Deliverer can mention
/// them without re-deriving them from the stdout log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    /// Combined, truncated stdout+stderr used as the Auditor's traceback
    /// input on failure. Empty on success.
    pub traceback: String,
    /// Paths (relative to the task's working directory) the sandbox
    /// detected as newly created or modified output.
    pub artifacts: Vec<std::path::PathBuf>,
    pub timed_out: bool,
    pub auto_installed: Vec<String>,
}

impl ExecutionResult {
    pub fn ok(stdout: String, stderr: String, artifacts: Vec<std::path::PathBuf>) -> Self {
        Self {
            success: true,
            exit_code: Some(0),
            stdout,
            stderr,
            traceback: String::new(),
            artifacts,
            timed_out: false,
            auto_installed: Vec::new(),
        }
    }

    pub fn failed(exit_code: Option<i32>, stdout: String, stderr: String, traceback: String) -> Self {
        Self {
            success: false,
            exit_code,
            stdout,
            stderr,
            traceback,
            artifacts: Vec::new(),
            timed_out: false,
            auto_installed: Vec::new(),
        }
    }

    pub fn timed_out(traceback: String) -> Self {
        Self {
            success: false,
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
            traceback,
            artifacts: Vec::new(),
            timed_out: true,
            auto_installed: Vec::new(),
        }
    }
}

#[cfg(test)]
#[path = "execution_tests.rs"]
mod tests;
