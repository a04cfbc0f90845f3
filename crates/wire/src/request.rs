// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Requests a front-end adapter sends to the daemon over the Unix
//! socket. One `Request` per chat-front-end command the distilled spec
//! names, plus the connection-lifecycle variants every adapter needs.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// An action against the recurring-job scheduler's own store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action")]
pub enum ScheduleAction {
    Create { interval_s: u64, target: String },
    List,
    Remove { id_prefix: String },
}

/// Request from a front-end adapter (chat bot, CLI) to the daemon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    /// Version handshake, sent once per connection.
    Hello { version: String },
    /// Liveness check.
    Ping,
    /// Ask the daemon to shut down cleanly.
    Shutdown,

    /// Submit a plain-language task.
    Submit { user_id: String, message: String, #[serde(default)] files: Vec<PathBuf> },
    /// List in-flight tasks for `user_id`, with current stage.
    Status { user_id: String },
    /// Recent tasks for `user_id`, most recent first.
    History { user_id: String, limit: usize },
    /// Full detail for one of `user_id`'s tasks, matched by id prefix.
    Task { user_id: String, task_id_prefix: String },
    /// Token usage totals for `user_id`.
    Usage { user_id: String },
    /// Spend for today and the current month, with per-model breakdown.
    Cost,
    /// RAM, disk, local-model availability, per-project health, API stats.
    Health,
    /// Run a single command through the sandbox's safety layer directly,
    /// bypassing the classify/plan stages.
    Exec { user_id: String, command: String },
    /// View or clear `user_id`'s conversation history.
    Context { user_id: String, clear: bool },
    /// Cancel every in-flight task belonging to `user_id`.
    Cancel { user_id: String },
    /// List registered projects.
    ListProjects,
    /// Create, list, or remove a recurring job.
    Schedule { action: ScheduleAction },
    /// Run a strict-AND sequence of sub-prompts, substituting `{output}`
    /// with the previous step's primary artifact path.
    Chain { user_id: String, steps: Vec<String> },
    /// Fetch the debug sidecar for a task whose id starts with `task_id_prefix`.
    Debug { task_id_prefix: String },
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
