// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! DTOs exchanged between the daemon and a front-end adapter. Mirrors
//! the shape of `taskd-core` records without exposing internal types
//! directly, so the wire format doesn't churn every time the core
//! model grows a field.

use serde::{Deserialize, Serialize};
use taskd_core::{TaskId, TaskStatus, TaskType, TokenUsage};

/// One line in a task listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskSummary {
    pub id: TaskId,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_type: Option<TaskType>,
    /// Current pipeline stage name, present only while running.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    /// Last few lines of streamed stdout, present only while running.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub live_tail: Vec<String>,
    pub created_at_ms: u64,
    pub message_preview: String,
}

/// Full detail for a single task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskDetail {
    pub id: TaskId,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_type: Option<TaskType>,
    pub message: String,
    pub created_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub usage: TokenUsage,
    pub retry_count: u32,
    /// Lines streamed so far, for a task still running.
    #[serde(default)]
    pub live_output: Vec<String>,
}

/// One entry in a `history` listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub id: TaskId,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_type: Option<TaskType>,
    pub created_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

/// Token totals over some window.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UsageTotals {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub thinking_tokens: u64,
}

/// Spend attributed to one model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelCost {
    pub model: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub thinking_tokens: u64,
    pub cost_usd: f64,
}

/// Cost breakdown for today and the current month.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CostReport {
    pub today_usd: f64,
    pub month_usd: f64,
    pub by_model: Vec<ModelCost>,
}

/// Health of one registered project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectHealth {
    pub name: String,
    pub path_exists: bool,
}

/// System and dependency health snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthReport {
    pub ram_available_mb: u64,
    pub disk_free_mb: u64,
    pub local_model_available: bool,
    pub container_backend_available: bool,
    pub in_flight_count: usize,
    pub api_calls_today: u64,
    pub projects: Vec<ProjectHealth>,
}

/// One registered project, as returned by `list-projects`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectSummary {
    pub name: String,
    pub path: String,
    pub description: String,
    pub trigger_count: usize,
}

/// One recurring job created via `schedule`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduleEntry {
    pub id: String,
    pub interval_s: u64,
    pub target: String,
    pub created_at_ms: u64,
}

/// One turn of conversation, as returned by `context`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationTurnView {
    pub role: String,
    pub content: String,
}

/// View of a task's debug sidecar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DebugSidecarView {
    pub task_id: TaskId,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_type: Option<TaskType>,
    pub stage_durations_ms: Vec<(String, u64)>,
    pub total_duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verdict: Option<String>,
    pub retry_count: u32,
}

/// Result of one step of a `chain` command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChainStepResult {
    pub step_index: usize,
    pub task_id: TaskId,
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_path: Option<String>,
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
