// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Auditor: an infrastructure-failure short-circuit first, then a
//! Gateway verdict call with a JSON -> balanced-brace -> keyword parse
//! fallback chain. A missing verdict is always `Fail`, never `Pass`.

use serde::Deserialize;
use taskd_core::{ApiUsageRecord, AuditVerdict, PipelineState, TaskType};
use taskd_gateway::{Complexity, Purpose};

use crate::deps::PipelineDeps;
use crate::error::NodeError;

/// Infrastructure-failure signatures that short-circuit straight to
/// delivery. Deliberately conservative: "Permission denied" and
/// "Connection refused" are excluded because they can be caused by
/// fixable code, not the environment.
const ENVIRONMENT_ERROR_SIGNATURES: &[&str] = &[
    "process group",
    "killed after",
    "timed out",
    "No space left",
    "Bad file descriptor",
    "Temporary failure in name resolution",
    "Name or service not known",
];

fn is_environment_error(traceback: &str, stderr: &str) -> bool {
    ENVIRONMENT_ERROR_SIGNATURES.iter().any(|sig| traceback.contains(sig) || stderr.contains(sig))
}

#[derive(Deserialize)]
struct AuditResponse {
    verdict: String,
}

fn parse_verdict(content: &str) -> AuditVerdict {
    let trimmed = content.trim();

    if let Ok(parsed) = serde_json::from_str::<AuditResponse>(trimmed) {
        return verdict_from_str(&parsed.verdict);
    }

    if let Some(extracted) = extract_balanced_braces(trimmed) {
        if let Ok(parsed) = serde_json::from_str::<AuditResponse>(&extracted) {
            return verdict_from_str(&parsed.verdict);
        }
    }

    if trimmed.to_lowercase().contains("pass") {
        return AuditVerdict::Pass;
    }

    // Missing or unrecognised verdict defaults to `Fail`, never `Pass`.
    AuditVerdict::Fail
}

fn verdict_from_str(s: &str) -> AuditVerdict {
    if s.eq_ignore_ascii_case("pass") {
        AuditVerdict::Pass
    } else {
        AuditVerdict::Fail
    }
}

/// Extract the first balanced `{...}` span, tolerating prose around it.
fn extract_balanced_braces(text: &str) -> Option<String> {
    let start = text.find('{')?;
    let mut depth = 0i32;
    for (offset, ch) in text[start..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(text[start..start + offset + ch.len_utf8()].to_string());
                }
            }
            _ => {}
        }
    }
    None
}

fn criteria_prompt(task_type: TaskType) -> &'static str {
    match task_type {
        TaskType::Project => "Judge whether the project command ran and achieved the requested change.",
        TaskType::Frontend => "Judge whether the generated frontend code would render the requested UI.",
        TaskType::UiDesign => "Judge whether the design artifact matches the requested look and content.",
        TaskType::Automation => "Judge whether the described side effect actually occurred.",
        TaskType::Data => "Judge whether the computed result answers the request correctly.",
        TaskType::File => "Judge whether the expected output files exist with sane content.",
        TaskType::Code => "Judge whether the script ran successfully and produced the requested result.",
    }
}

pub async fn run(
    state: &mut PipelineState,
    deps: &PipelineDeps,
    now_ms: u64,
    usage: &mut Vec<ApiUsageRecord>,
) -> Result<(), NodeError> {
    let Some(execution) = &state.execution else {
        state.verdict = Some(AuditVerdict::Fail);
        state.retry_count += 1;
        return Ok(());
    };

    if is_environment_error(&execution.traceback, &execution.stderr) {
        state.verdict = Some(AuditVerdict::Fail);
        state.retry_count = deps.max_retries;
        return Ok(());
    }

    let task_type = state.task_type.unwrap_or(TaskType::Code);
    let system = format!(
        "{}\n\nRespond with JSON: {{\"verdict\": \"pass\"}} or {{\"verdict\": \"fail\"}}.\n\n\
         Plan:\n{}\n\nExecution exit code: {:?}\nStdout:\n{}\nStderr:\n{}",
        criteria_prompt(task_type),
        state.plan.as_deref().unwrap_or(""),
        execution.exit_code,
        execution.stdout,
        execution.stderr,
    );

    let call = deps
        .gateway
        .call(
            state.task_id,
            Purpose::Audit,
            Complexity::High,
            state.message.clone(),
            Some(system),
            256,
            false,
            deps.route_ctx,
            usage.as_slice(),
            now_ms,
        )
        .await?;
    usage.push(call.record.clone());

    let verdict = parse_verdict(&call.content);
    state.verdict = Some(verdict);
    if verdict != AuditVerdict::Pass {
        state.retry_count += 1;
    }
    Ok(())
}

#[cfg(test)]
#[path = "audit_tests.rs"]
mod tests;
