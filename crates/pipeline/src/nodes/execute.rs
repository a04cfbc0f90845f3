// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Executor: turns the Planner's plan into a running command. The
//! project sub-path shell-quotes placeholder values into a registered
//! command; the free-form sub-path asks the Gateway for code, strips its
//! fence, and runs it through the auto-install loop.

use std::collections::HashMap;
use std::time::Duration;

use taskd_core::{ApiUsageRecord, PipelineState, TaskType};
use taskd_gateway::{Complexity, Purpose};
use taskd_runbook::{extract_placeholders, fill_placeholders};
use taskd_sandbox::autoinstall::RetryBudget;
use taskd_sandbox::{artifacts, autoinstall, env_strip, refuse_if_unsafe};

use crate::deps::PipelineDeps;
use crate::error::NodeError;
use crate::fences;

fn clamp_timeout(requested_s: u64, hard_cap_s: u64) -> Duration {
    Duration::from_secs(requested_s.min(hard_cap_s).max(1))
}

async fn run_project_step(
    state: &mut PipelineState,
    deps: &PipelineDeps,
    now_ms: u64,
    usage: &mut Vec<ApiUsageRecord>,
) -> Result<(), NodeError> {
    let project_name = state.project.clone().unwrap_or_default();
    let Some(project) = deps.registry.by_name(&project_name).cloned() else {
        return Err(NodeError::InvalidResponse(format!("unknown project {project_name}")));
    };

    // The plan names which registered command to run; the Planner is
    // instructed to state it as the first line of the plan.
    let command_name = state.plan.as_deref().and_then(|p| p.lines().next()).unwrap_or_default().trim();
    let Some(template) = project.commands.get(command_name) else {
        return Err(NodeError::InvalidResponse(format!("plan named unknown command {command_name}")));
    };

    let placeholder_names = extract_placeholders(template);
    let values = if placeholder_names.is_empty() {
        HashMap::new()
    } else {
        let instruction = format!(
            "Extract values for these placeholders from the user's message, as JSON: {}. \
             Respond with a single JSON object mapping each name to its string value.",
            placeholder_names.join(", ")
        );
        let call = deps
            .gateway
            .call(
                state.task_id,
                Purpose::Plan,
                Complexity::Low,
                state.message.clone(),
                Some(instruction),
                256,
                false,
                deps.route_ctx,
                usage.as_slice(),
                now_ms,
            )
            .await?;
        usage.push(call.record.clone());
        let (body, _lang) = fences::strip_fence(&call.content);
        serde_json::from_str::<HashMap<String, String>>(&body).unwrap_or_default()
    };

    let command = fill_placeholders(template, &values);
    refuse_if_unsafe(&command, deps.sandbox.is_some())
        .map_err(|e| NodeError::RefusedBySafety(e.to_string()))?;

    let env = project.env_path.as_ref().map(|_| env_strip::child_env(&HashMap::new())).unwrap_or_default();
    let timeout = clamp_timeout(project.timeout_s, deps.exec_hard_cap_s);

    let result = autoinstall::run_with_autoinstall(
        "bash",
        &["-c".to_string(), command],
        &project.path,
        &env,
        timeout,
        RetryBudget::Project,
        deps.live_output.clone(),
    )
    .await?;

    state.working_dir = project.path.clone();
    state.auto_installed = result.auto_installed.clone();
    state.artifacts = result.artifacts.clone();
    state.execution = Some(result);
    Ok(())
}

async fn run_free_form_step(
    state: &mut PipelineState,
    deps: &PipelineDeps,
    now_ms: u64,
    usage: &mut Vec<ApiUsageRecord>,
) -> Result<(), NodeError> {
    let task_type = state.task_type.unwrap_or(TaskType::Code);
    let system = format!(
        "Write a single, runnable {} script that carries out this plan:\n\n{}",
        task_type,
        state.plan.as_deref().unwrap_or("")
    );

    let call = deps
        .gateway
        .call(
            state.task_id,
            Purpose::CodeGen,
            Complexity::High,
            state.message.clone(),
            Some(system),
            4096,
            false,
            deps.route_ctx,
            usage.as_slice(),
            now_ms,
        )
        .await?;
    usage.push(call.record.clone());

    let (code, language) = fences::strip_fence(&call.content);
    refuse_if_unsafe(&code, deps.sandbox.is_some()).map_err(|e| NodeError::RefusedBySafety(e.to_string()))?;
    state.code = Some(code.clone());

    let script_path = state.working_dir.join(format!("task.{}", language.extension()));
    tokio::fs::write(&script_path, &code).await.map_err(NodeError::Standards)?;

    let env = env_strip::child_env(&HashMap::new());
    let timeout = clamp_timeout(deps.exec_timeout_s, deps.exec_hard_cap_s);
    let before = artifacts::snapshot_before(&state.working_dir).await;

    let result = if let Some(container) = &deps.sandbox {
        if container.is_available().await {
            container
                .run(
                    language.program(),
                    &[script_path.display().to_string()],
                    &state.working_dir,
                    timeout,
                    deps.live_output.clone(),
                )
                .await?
        } else {
            autoinstall::run_with_autoinstall(
                language.program(),
                &[script_path.display().to_string()],
                &state.working_dir,
                &env,
                timeout,
                RetryBudget::FreeForm,
                deps.live_output.clone(),
            )
            .await?
        }
    } else {
        autoinstall::run_with_autoinstall(
            language.program(),
            &[script_path.display().to_string()],
            &state.working_dir,
            &env,
            timeout,
            RetryBudget::FreeForm,
            deps.live_output.clone(),
        )
        .await?
    };

    let artifacts = artifacts::resolve(&result.stdout, &state.working_dir, &before).await;
    state.auto_installed = result.auto_installed.clone();
    state.artifacts = artifacts;
    state.execution = Some(result);
    Ok(())
}

pub async fn run(
    state: &mut PipelineState,
    deps: &PipelineDeps,
    now_ms: u64,
    usage: &mut Vec<ApiUsageRecord>,
) -> Result<(), NodeError> {
    if state.task_type == Some(TaskType::Project) {
        run_project_step(state, deps, now_ms, usage).await
    } else {
        run_free_form_step(state, deps, now_ms, usage).await
    }
}

#[cfg(test)]
#[path = "execute_tests.rs"]
mod tests;
