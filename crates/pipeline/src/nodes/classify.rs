// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Classifier: trigger-phrase fast path over the project registry, then
//! a Gateway slow path with a keyword fallback.

use serde::Deserialize;
use taskd_core::{ApiUsageRecord, PipelineState, TaskType};
use taskd_gateway::{Complexity, Purpose};

use crate::deps::PipelineDeps;
use crate::error::NodeError;

#[derive(Deserialize)]
struct ClassifyVerdict {
    task_type: String,
}

fn task_type_from_str(s: &str) -> Option<TaskType> {
    TaskType::FALLBACK_ORDER.into_iter().find(|t| t.as_str() == s)
}

/// Keyword fallback used when the Gateway's JSON verdict fails to parse.
/// Iterates the spec's anti-retry-loop order (`code` last) and returns
/// the first type whose name appears in the message.
fn keyword_fallback(message: &str) -> TaskType {
    let lower = message.to_lowercase();
    for task_type in TaskType::FALLBACK_ORDER {
        if lower.contains(task_type.as_str().replace('_', " ").as_str()) {
            return task_type;
        }
    }
    TaskType::Code
}

pub async fn run(
    state: &mut PipelineState,
    deps: &PipelineDeps,
    now_ms: u64,
    usage: &mut Vec<ApiUsageRecord>,
) -> Result<(), NodeError> {
    if let Some(project) = deps.registry.match_trigger(&state.message) {
        state.task_type = Some(TaskType::Project);
        state.project = Some(project.name.clone());
        return Ok(());
    }

    let call = deps
        .gateway
        .call(
            state.task_id,
            Purpose::Classify,
            Complexity::Low,
            state.message.clone(),
            Some(
                "Classify the user's message into exactly one of: project, frontend, ui_design, \
                 automation, data, file, code. Respond with JSON: {\"task_type\": \"<type>\"}."
                    .to_string(),
            ),
            256,
            false,
            deps.route_ctx,
            usage.as_slice(),
            now_ms,
        )
        .await?;
    usage.push(call.record.clone());

    let task_type = serde_json::from_str::<ClassifyVerdict>(call.content.trim())
        .ok()
        .and_then(|v| task_type_from_str(&v.task_type))
        .unwrap_or_else(|| keyword_fallback(&state.message));

    // A project classification without a matching registry trigger is
    // unreliable — the model is guessing at a project that was never
    // confirmed against the registry's trigger phrases.
    state.task_type = Some(if task_type == TaskType::Project { TaskType::Code } else { task_type });
    Ok(())
}

#[cfg(test)]
#[path = "classify_tests.rs"]
mod tests;
