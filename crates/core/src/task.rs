// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Task` entity and its lifecycle.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Opaque unique identifier for a task.
    pub struct TaskId("tsk-");
}

/// Closed set of task types the Classifier assigns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Project,
    Frontend,
    UiDesign,
    Automation,
    Data,
    File,
    Code,
}

impl TaskType {
    /// Keyword fallback order used when the classifier's JSON verdict
    /// fails to parse: specific types first, `code` last so an
    /// unrecognised message never gets stuck retrying as `project`.
    pub const FALLBACK_ORDER: [TaskType; 7] = [
        TaskType::Project,
        TaskType::Frontend,
        TaskType::UiDesign,
        TaskType::Automation,
        TaskType::Data,
        TaskType::File,
        TaskType::Code,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Project => "project",
            TaskType::Frontend => "frontend",
            TaskType::UiDesign => "ui_design",
            TaskType::Automation => "automation",
            TaskType::Data => "data",
            TaskType::File => "file",
            TaskType::Code => "code",
        }
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status. Transitions only move forward; `Task::set_status`
/// debug-asserts monotonicity so a regression trips in tests long before
/// it corrupts a history view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Running,
    Done,
    Failed,
    Crashed,
    Cancelled,
}

impl TaskStatus {
    /// Terminal statuses never transition further.
    fn rank(self) -> u8 {
        match self {
            TaskStatus::Pending => 0,
            TaskStatus::Running => 1,
            TaskStatus::Done | TaskStatus::Failed | TaskStatus::Crashed | TaskStatus::Cancelled => 2,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.rank() == 2
    }
}

/// Token usage recorded against a task (summed from the Gateway calls its
/// pipeline run made).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input: u64,
    pub output: u64,
    pub thinking: u64,
}

impl TokenUsage {
    pub fn add(&mut self, other: TokenUsage) {
        self.input += other.input;
        self.output += other.output;
        self.thinking += other.thinking;
    }
}

/// A single task submitted by the chat front-end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub user_id: String,
    pub message: String,
    pub files: Vec<PathBuf>,
    pub status: TaskStatus,
    pub created_at_ms: u64,
    pub completed_at_ms: Option<u64>,
    pub result: Option<String>,
    pub error: Option<String>,
    pub usage: TokenUsage,
    pub task_type: Option<TaskType>,
}

impl Task {
    pub fn new(user_id: impl Into<String>, message: impl Into<String>, created_at_ms: u64) -> Self {
        Self {
            id: TaskId::new(),
            user_id: user_id.into(),
            message: message.into(),
            files: Vec::new(),
            status: TaskStatus::Pending,
            created_at_ms,
            completed_at_ms: None,
            result: None,
            error: None,
            usage: TokenUsage::default(),
            task_type: None,
        }
    }

    /// Advance to `next`. Panics in debug builds on a backward transition —
    /// this is an internal invariant, never a user-facing error.
    pub fn set_status(&mut self, next: TaskStatus) {
        debug_assert!(
            next.rank() >= self.status.rank(),
            "task status must advance monotonically: {:?} -> {:?}",
            self.status,
            next
        );
        self.status = next;
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
