// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Facts the daemon appends to the WAL. State is always derived from
//! replaying these, never mutated directly.

use serde::{Deserialize, Serialize};
use taskd_core::{ApiUsageRecord, ConversationHistoryRecord, ProjectMemoryRecord, Task, TaskId, TaskStatus, TokenUsage};

/// One fact recorded in the write-ahead log.
///
/// Every variant must be idempotent to apply: replaying the same event
/// twice (once for immediate visibility, once during WAL replay after a
/// crash) must leave `TaskdState` in the same shape as applying it once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    TaskCreated { task: Task },
    TaskStatusChanged { task_id: TaskId, status: TaskStatus },
    TaskCompleted {
        task_id: TaskId,
        status: TaskStatus,
        result: Option<String>,
        error: Option<String>,
        completed_at_ms: u64,
        usage: TokenUsage,
    },
    ConversationAppended { record: ConversationHistoryRecord },
    ApiUsageRecorded { record: ApiUsageRecord },
    ProjectMemoryRecorded { record: ProjectMemoryRecord },
    /// Control event. Carries no state change; the daemon's replay loop
    /// recognises it and stops without acting on it further.
    Shutdown,
}
