// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized state derived from WAL replay.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use taskd_core::{ApiUsageRecord, ConversationHistoryRecord, ProjectMemoryRecord, Task, TaskId};

use crate::event::Event;

/// The full durable state of the daemon: tasks, their conversation
/// history, recorded API spend, and accumulated project memory.
///
/// Always derived by folding [`Event`]s over [`Self::apply_event`];
/// never mutated directly outside that function, so a snapshot and a
/// freshly-replayed WAL always agree.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct TaskdState {
    pub tasks: HashMap<TaskId, Task>,
    #[serde(default)]
    pub conversation_history: Vec<ConversationHistoryRecord>,
    #[serde(default)]
    pub api_usage: Vec<ApiUsageRecord>,
    #[serde(default)]
    pub project_memory: Vec<ProjectMemoryRecord>,
}

impl TaskdState {
    pub fn get_task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.get(id)
    }

    /// Conversation turns recorded for `task_id`, in recording order.
    pub fn history_for(&self, task_id: &TaskId) -> Vec<&ConversationHistoryRecord> {
        self.conversation_history.iter().filter(|r| &r.task_id == task_id).collect()
    }

    /// Lessons recorded against `project`, most recent last.
    pub fn memory_for(&self, project: &str) -> Vec<&ProjectMemoryRecord> {
        self.project_memory.iter().filter(|r| r.project == project).collect()
    }

    /// Sum of tokens spent by `user_id` since `since_ms`, for the daily
    /// and monthly budget checks.
    pub fn usage_since(&self, since_ms: u64) -> u64 {
        self.api_usage
            .iter()
            .filter(|r| r.recorded_at_ms >= since_ms)
            .map(|r| r.input_tokens + r.output_tokens + r.thinking_tokens)
            .sum()
    }

    /// Apply one logged fact to derive the next state. Every branch must
    /// be idempotent: replaying the same event twice (once for immediate
    /// visibility, once during WAL replay after a crash) must not double
    /// a side effect like an append-only history record.
    pub fn apply_event(&mut self, event: &Event) {
        match event {
            Event::TaskCreated { task } => {
                self.tasks.entry(task.id).or_insert_with(|| task.clone());
            }
            Event::TaskStatusChanged { task_id, status } => {
                if let Some(task) = self.tasks.get_mut(task_id) {
                    task.status = *status;
                }
            }
            Event::TaskCompleted { task_id, status, result, error, completed_at_ms, usage } => {
                if let Some(task) = self.tasks.get_mut(task_id) {
                    task.status = *status;
                    task.result = result.clone();
                    task.error = error.clone();
                    task.completed_at_ms = Some(*completed_at_ms);
                    task.usage = *usage;
                }
            }
            Event::ConversationAppended { record } => {
                if !self.conversation_history.iter().any(|r| {
                    r.task_id == record.task_id && r.recorded_at_ms == record.recorded_at_ms && r.role == record.role
                }) {
                    self.conversation_history.push(record.clone());
                }
            }
            Event::ApiUsageRecorded { record } => {
                if !self
                    .api_usage
                    .iter()
                    .any(|r| r.task_id == record.task_id && r.recorded_at_ms == record.recorded_at_ms)
                {
                    self.api_usage.push(record.clone());
                }
            }
            Event::ProjectMemoryRecorded { record } => {
                if !self
                    .project_memory
                    .iter()
                    .any(|r| r.project == record.project && r.recorded_at_ms == record.recorded_at_ms)
                {
                    self.project_memory.push(record.clone());
                }
            }
            Event::Shutdown => {}
        }
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
