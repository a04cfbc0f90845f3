// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persisted record types: API spend, project memory, conversation history.
//!
//! These are the rows `taskd-storage` materialises from its WAL; they
//! carry no behaviour of their own beyond small enums.

use serde::{Deserialize, Serialize};

use crate::task::TaskId;

/// One Gateway call's token spend, kept for the budget ledger and for
/// per-task cost reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiUsageRecord {
    pub task_id: TaskId,
    pub purpose: String,
    pub model: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub thinking_tokens: u64,
    pub recorded_at_ms: u64,
}

/// Whether a remembered project-memory entry turned out to help.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Failure,
}

/// A lesson recorded against a project after a task completes, consulted
/// by the Planner on future tasks against the same project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMemoryRecord {
    pub project: String,
    pub lesson: String,
    pub outcome: Outcome,
    pub recorded_at_ms: u64,
}

/// Who authored one turn of a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One persisted turn of a task's chat history, keyed by task for easy
/// lookup when a chained task asks "what did the prior task in this
/// chain say".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationHistoryRecord {
    pub task_id: TaskId,
    pub user_id: String,
    pub role: Role,
    pub content: String,
    pub recorded_at_ms: u64,
}

#[cfg(test)]
#[path = "records_tests.rs"]
mod tests;
