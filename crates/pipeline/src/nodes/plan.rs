// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Planner: builds a task-type-specific system prompt, asks the Gateway
//! for a plan, and records it on `PipelineState::plan`.

use taskd_core::{ApiUsageRecord, PipelineState, TaskType};
use taskd_gateway::{Complexity, Purpose};

use crate::deps::PipelineDeps;
use crate::error::NodeError;
use crate::prompts;

const ARTIFACTS_INSTRUCTION: &str = "\
If your plan produces files, print a final line `ARTIFACTS: [\"path1\", \"path2\"]` \
listing every output path relative to the working directory. Never claim success unless \
the plan actually accomplishes the request.";

fn project_context_block(deps: &PipelineDeps, project: &str) -> String {
    match deps.registry.by_name(project) {
        Some(p) => format!(
            "Project \"{}\" at {}. {}\nRegistered commands: {}.\n{}",
            p.name,
            p.path.display(),
            p.description,
            p.commands.keys().cloned().collect::<Vec<_>>().join(", "),
            relevant_files_block(&p.path, deps.file_injection_cap_chars),
        ),
        None => String::new(),
    }
}

/// Only worth injecting for small trees: a handful of top-level files, up
/// to `MAX_FILES`, each capped to `cap_chars` so one huge file can't blow
/// out the prompt budget.
const MAX_FILES: usize = 5;
const MAX_TREE_ENTRIES: usize = 50;

fn relevant_files_block(project_path: &std::path::Path, cap_chars: usize) -> String {
    let Ok(entries) = std::fs::read_dir(project_path) else {
        return String::new();
    };
    let mut files: Vec<_> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|e| e.path())
        .collect();
    if files.len() > MAX_TREE_ENTRIES {
        return String::new();
    }
    files.sort();
    files.truncate(MAX_FILES);

    let mut out = String::new();
    for path in files {
        let Ok(content) = std::fs::read_to_string(&path) else {
            continue;
        };
        let truncated: String = content.chars().take(cap_chars).collect();
        out.push_str(&format!("\n--- {} ---\n{}\n", path.display(), truncated));
    }
    out
}

fn retry_block(state: &PipelineState) -> String {
    if state.retry_count == 0 {
        return String::new();
    }
    let traceback = state.execution.as_ref().map(|e| e.traceback.as_str()).unwrap_or("");
    let feedback = state.audit_feedback.as_deref().unwrap_or("");
    format!(
        "\nThis is retry {} of the plan/execute/audit loop. The previous attempt failed.\n\
         Auditor feedback: {}\nTraceback: {}\n",
        state.retry_count, feedback, traceback
    )
}

fn conversation_block(state: &PipelineState) -> String {
    if state.conversation.is_empty() {
        return String::new();
    }
    let mut out = String::from("\nConversation so far:\n");
    for turn in &state.conversation {
        out.push_str(&format!("{}: {}\n", turn.role, turn.content));
    }
    out
}

pub async fn run(
    state: &mut PipelineState,
    deps: &PipelineDeps,
    now_ms: u64,
    usage: &mut Vec<ApiUsageRecord>,
) -> Result<(), NodeError> {
    let task_type = state.task_type.unwrap_or(TaskType::Code);
    let mut system = prompts::system_prompt(task_type);

    if task_type == TaskType::Project {
        if let Some(project) = &state.project {
            system.push('\n');
            system.push_str(&project_context_block(deps, project));
        }
    } else if let Some(path) = &deps.coding_standards_path {
        let standards = crate::standards::load(path, deps.coding_standards_cap_chars)?;
        if !standards.is_empty() {
            system.push_str("\n\nCoding standards:\n");
            system.push_str(&standards);
        }
    }

    system.push_str(&conversation_block(state));
    system.push_str(&retry_block(state));
    system.push('\n');
    system.push_str(ARTIFACTS_INSTRUCTION);

    // A retry deserves a stronger model than the initial attempt.
    let complexity = if state.retry_count > 0 { Complexity::High } else { Complexity::Low };

    let call = deps
        .gateway
        .call(
            state.task_id,
            Purpose::Plan,
            complexity,
            state.message.clone(),
            Some(system),
            2048,
            true,
            deps.route_ctx,
            usage.as_slice(),
            now_ms,
        )
        .await?;
    usage.push(call.record.clone());

    state.plan = Some(call.content);
    Ok(())
}

#[cfg(test)]
#[path = "plan_tests.rs"]
mod tests;
