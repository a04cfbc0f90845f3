// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deliverer: composes the user-facing response, writes the debug
//! sidecar unconditionally, and (for project tasks) distills a lesson
//! for the project memory ledger. Artifacts are only surfaced on a
//! `Pass` verdict; a failed run never claims success.

use std::path::PathBuf;

use serde::Serialize;
use taskd_core::{ApiUsageRecord, AuditVerdict, Outcome, PipelineState, ProjectMemoryRecord, Task, TaskType};
use taskd_gateway::{Complexity, Purpose};

use crate::deps::PipelineDeps;
use crate::error::NodeError;

const MESSAGE_CAP_CHARS: usize = 300;
const FEEDBACK_CAP_CHARS: usize = 500;
/// Two or more recent tasks of the same type within this window are
/// treated as a recurring pattern worth suggesting automation for.
const RECURRENCE_WINDOW_MS: u64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Serialize)]
struct DebugStageTiming {
    name: String,
    duration_ms: u64,
}

#[derive(Debug, Serialize)]
struct DebugSidecar {
    task_id: String,
    message: String,
    task_type: TaskType,
    stages: Vec<DebugStageTiming>,
    total_duration_ms: u64,
    verdict: Option<AuditVerdict>,
    retry_count: u32,
}

fn strip_home_prefix(text: &str) -> String {
    match dirs::home_dir() {
        Some(home) => text.replace(&home.display().to_string(), "~"),
        None => text.to_string(),
    }
}

fn truncate_chars(text: &str, cap: usize) -> String {
    text.chars().take(cap).collect()
}

fn sidecar_for(state: &PipelineState) -> DebugSidecar {
    let stages: Vec<DebugStageTiming> = state
        .timings
        .iter()
        .map(|t| DebugStageTiming { name: t.stage.to_string(), duration_ms: t.duration_ms })
        .collect();
    let total_duration_ms = stages.iter().map(|s| s.duration_ms).sum();
    DebugSidecar {
        task_id: state.task_id.to_string(),
        message: truncate_chars(&strip_home_prefix(&state.message), MESSAGE_CAP_CHARS),
        task_type: state.task_type.unwrap_or(TaskType::Code),
        stages,
        total_duration_ms,
        verdict: state.verdict,
        retry_count: state.retry_count,
    }
}

fn write_sidecar(state: &PipelineState) -> Result<(), NodeError> {
    let outputs_dir = state.working_dir.join("outputs");
    std::fs::create_dir_all(&outputs_dir).map_err(NodeError::Standards)?;
    let sidecar = sidecar_for(state);
    let body = serde_json::to_string_pretty(&sidecar)
        .map_err(|e| NodeError::InvalidResponse(format!("debug sidecar serialization failed: {e}")))?;
    let path: PathBuf = outputs_dir.join(format!("{}.debug.json", state.task_id));
    std::fs::write(path, body).map_err(NodeError::Standards)
}

fn recurrence_suggestion(task_type: TaskType, recent_tasks: &[Task], now_ms: u64) -> Option<String> {
    let count = recent_tasks
        .iter()
        .filter(|t| t.task_type == Some(task_type) && now_ms.saturating_sub(t.created_at_ms) <= RECURRENCE_WINDOW_MS)
        .count();
    if count >= 2 {
        Some(format!(
            "You've asked for {count} {task_type} tasks like this in the last day \u{2014} \
             consider registering it as a project command."
        ))
    } else {
        None
    }
}

pub async fn run(
    state: &mut PipelineState,
    deps: &PipelineDeps,
    now_ms: u64,
    usage: &mut Vec<ApiUsageRecord>,
    recent_tasks: &[Task],
) -> Result<Option<ProjectMemoryRecord>, NodeError> {
    let passed = state.verdict == Some(AuditVerdict::Pass);
    let task_type = state.task_type.unwrap_or(TaskType::Code);

    if !passed {
        state.artifacts.clear();
    }

    let feedback = truncate_chars(state.audit_feedback.as_deref().unwrap_or(""), FEEDBACK_CAP_CHARS);
    let execution_summary = state
        .execution
        .as_ref()
        .map(|e| format!("exit code {:?}, stderr: {}", e.exit_code, truncate_chars(&e.stderr, FEEDBACK_CAP_CHARS)))
        .unwrap_or_default();

    let system = if passed {
        format!(
            "Write a short message to the user reporting that their request succeeded. \
             Mention the produced artifacts if any: {:?}. Do not invent details not in the plan or output.\n\n\
             Plan:\n{}",
            state.artifacts,
            state.plan.as_deref().unwrap_or(""),
        )
    } else {
        format!(
            "Write a short message to the user explaining that their request did not succeed. \
             Never claim success. Ground the explanation in this feedback and execution summary, \
             and suggest one concrete next step.\n\nAuditor feedback: {feedback}\nExecution: {execution_summary}",
        )
    };

    let call = deps
        .gateway
        .call(
            state.task_id,
            Purpose::Plan,
            Complexity::Low,
            state.message.clone(),
            Some(system),
            512,
            false,
            deps.route_ctx,
            usage.as_slice(),
            now_ms,
        )
        .await?;
    usage.push(call.record.clone());

    let mut response = call.content;
    if let Some(suggestion) = recurrence_suggestion(task_type, recent_tasks, now_ms) {
        response.push_str("\n\n");
        response.push_str(&suggestion);
    }
    state.response = Some(response);

    write_sidecar(state)?;

    if task_type != TaskType::Project {
        return Ok(None);
    }
    let Some(project) = &state.project else {
        return Ok(None);
    };

    let lesson_system = format!(
        "In one sentence, record a lesson from this run for future attempts on this project. \
         Focus on what made it succeed or fail, not generic advice.\n\n\
         Plan:\n{}\nAuditor feedback: {feedback}",
        state.plan.as_deref().unwrap_or(""),
    );
    let lesson_call = deps
        .gateway
        .call(
            state.task_id,
            Purpose::Plan,
            Complexity::Low,
            state.message.clone(),
            Some(lesson_system),
            128,
            false,
            deps.route_ctx,
            usage.as_slice(),
            now_ms,
        )
        .await?;
    usage.push(lesson_call.record.clone());

    Ok(Some(ProjectMemoryRecord {
        project: project.clone(),
        lesson: truncate_chars(&lesson_call.content, FEEDBACK_CAP_CHARS),
        outcome: if passed { Outcome::Success } else { Outcome::Failure },
        recorded_at_ms: now_ms,
    }))
}

#[cfg(test)]
#[path = "deliver_tests.rs"]
mod tests;
