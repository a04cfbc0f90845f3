use std::sync::Arc;

use async_trait::async_trait;
use taskd_core::{ExecutionResult, Task, TaskId};
use taskd_gateway::{CompletionRequest, CompletionResponse, Gateway, GatewayConfig, GatewayError, ModelProvider};
use taskd_runbook::ProjectRegistry;

use super::*;

struct FixedProvider {
    content: String,
}

#[async_trait]
impl ModelProvider for FixedProvider {
    async fn complete(&self, _req: &CompletionRequest) -> Result<CompletionResponse, GatewayError> {
        Ok(CompletionResponse {
            content: self.content.clone(),
            input_tokens: 1,
            output_tokens: 1,
            thinking_tokens: 0,
        })
    }
}

fn deps_with(content: &str) -> PipelineDeps {
    let provider: Arc<dyn ModelProvider> = Arc::new(FixedProvider { content: content.to_string() });
    let gateway = Gateway::new(
        provider.clone(),
        provider,
        GatewayConfig { daily_cap_usd: 100.0, monthly_cap_usd: 1000.0, pricing: Default::default() },
    );
    PipelineDeps {
        gateway: Arc::new(gateway),
        registry: Arc::new(ProjectRegistry::empty()),
        sandbox: None,
        route_ctx: taskd_gateway::RouteContext { local_healthy: false, ram_low: false, spend_ratio: 0.0 },
        live_output: None,
        max_retries: 3,
        coding_standards_path: None,
        coding_standards_cap_chars: 2000,
        file_injection_cap_chars: 2000,
        exec_timeout_s: 30,
        exec_hard_cap_s: 120,
    }
}

fn state_in(dir: &std::path::Path) -> PipelineState {
    let mut s = PipelineState::new(TaskId::new(), "do the thing", dir.to_path_buf());
    s.task_type = Some(TaskType::Code);
    s.plan = Some("print hello".to_string());
    s.execution = Some(ExecutionResult::ok("hello".to_string(), String::new(), vec![dir.join("out.txt")]));
    s
}

#[tokio::test]
async fn keeps_artifacts_and_writes_sidecar_on_pass() {
    let dir = tempfile::tempdir().expect("tempdir");
    let deps = deps_with("All done, your file is ready.");
    let mut state = state_in(dir.path());
    state.verdict = Some(AuditVerdict::Pass);
    let mut usage = Vec::new();
    let memory = run(&mut state, &deps, 1_700_000_000_000, &mut usage, &[]).await.expect("deliver succeeds");
    assert!(memory.is_none());
    assert!(!state.artifacts.is_empty());
    assert!(state.response.unwrap().contains("ready"));
    let sidecar_path = dir.path().join("outputs").join(format!("{}.debug.json", state.task_id));
    assert!(sidecar_path.exists());
}

#[tokio::test]
async fn clears_artifacts_on_failure() {
    let dir = tempfile::tempdir().expect("tempdir");
    let deps = deps_with("Unfortunately the run failed because of a missing dependency.");
    let mut state = state_in(dir.path());
    state.verdict = Some(AuditVerdict::Fail);
    state.audit_feedback = Some("missing dependency foo".to_string());
    let mut usage = Vec::new();
    run(&mut state, &deps, 1_700_000_000_000, &mut usage, &[]).await.expect("deliver succeeds");
    assert!(state.artifacts.is_empty());
}

#[tokio::test]
async fn records_a_project_memory_lesson_for_project_tasks() {
    let dir = tempfile::tempdir().expect("tempdir");
    let deps = deps_with("Deployed successfully.");
    let mut state = state_in(dir.path());
    state.task_type = Some(TaskType::Project);
    state.project = Some("dashflow".to_string());
    state.verdict = Some(AuditVerdict::Pass);
    let mut usage = Vec::new();
    let memory = run(&mut state, &deps, 1_700_000_000_000, &mut usage, &[]).await.expect("deliver succeeds");
    let memory = memory.expect("project memory recorded");
    assert_eq!(memory.project, "dashflow");
    assert_eq!(memory.outcome, taskd_core::Outcome::Success);
}

#[tokio::test]
async fn suggests_automation_after_repeated_same_type_tasks() {
    let dir = tempfile::tempdir().expect("tempdir");
    let deps = deps_with("Done.");
    let mut state = state_in(dir.path());
    state.verdict = Some(AuditVerdict::Pass);
    let now_ms = 1_700_000_000_000;
    let recent = vec![
        Task { task_type: Some(TaskType::Code), created_at_ms: now_ms - 1000, ..Task::new("u1", "m1", now_ms - 1000) },
        Task { task_type: Some(TaskType::Code), created_at_ms: now_ms - 2000, ..Task::new("u1", "m2", now_ms - 2000) },
    ];
    let mut usage = Vec::new();
    run(&mut state, &deps, now_ms, &mut usage, &recent).await.expect("deliver succeeds");
    assert!(state.response.unwrap().contains("registering it as a project command"));
}
