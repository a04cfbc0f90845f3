// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Responses the daemon sends back to a front-end adapter.

use serde::{Deserialize, Serialize};
use taskd_core::TaskId;

use crate::types::{
    ChainStepResult, ConversationTurnView, CostReport, DebugSidecarView, HealthReport, HistoryEntry, ProjectSummary,
    ScheduleEntry, TaskDetail, TaskSummary, UsageTotals,
};

/// Response from daemon to front-end adapter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    /// Generic success with no payload.
    Ok,
    /// Reply to `Request::Ping`.
    Pong,
    /// Reply to `Request::Hello`.
    Hello { version: String },
    /// Daemon is shutting down; no further requests will be served.
    ShuttingDown,
    /// Request rejected or failed.
    Error { message: String },

    /// Task accepted and queued.
    TaskSubmitted { task: TaskSummary },
    /// Tasks currently in flight.
    Status { tasks: Vec<TaskSummary> },
    /// Recent tasks, most recent first.
    History { entries: Vec<HistoryEntry> },
    /// Full detail for a single task (used by the CLI's `tj task <id>`).
    TaskDetail { task: Option<Box<TaskDetail>> },
    /// Token usage totals.
    Usage { totals: UsageTotals },
    /// Spend breakdown.
    Cost { report: CostReport },
    /// System and dependency health.
    Health { report: HealthReport },
    /// Result of a direct `exec` command.
    ExecResult { exit_code: Option<i32>, stdout: String, stderr: String },
    /// Conversation history for the caller.
    Context { turns: Vec<ConversationTurnView> },
    /// Conversation history was cleared.
    ContextCleared,
    /// Tasks cancelled for the caller.
    Cancelled { cancelled: Vec<TaskId> },
    /// Registered projects.
    Projects { projects: Vec<ProjectSummary> },
    /// A recurring job was created.
    ScheduleCreated { entry: ScheduleEntry },
    /// Recurring jobs currently registered.
    Schedules { entries: Vec<ScheduleEntry> },
    /// A recurring job was removed.
    ScheduleRemoved { id: String },
    /// Result of a `chain` command: one entry per step attempted.
    ChainResult { steps: Vec<ChainStepResult>, failed_at: Option<usize> },
    /// Debug sidecar for a task.
    Debug { sidecar: Option<Box<DebugSidecarView>> },
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
