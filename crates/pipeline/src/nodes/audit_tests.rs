use std::sync::Arc;

use async_trait::async_trait;
use taskd_core::{ExecutionResult, TaskId};
use taskd_gateway::{CompletionRequest, CompletionResponse, Gateway, GatewayConfig, GatewayError, ModelProvider};
use taskd_runbook::ProjectRegistry;

use super::*;

struct FixedVerdictProvider {
    content: String,
}

#[async_trait]
impl ModelProvider for FixedVerdictProvider {
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
    let provider: Arc<dyn ModelProvider> = Arc::new(FixedVerdictProvider { content: content.to_string() });
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

fn state_with(execution: ExecutionResult) -> PipelineState {
    let mut s = PipelineState::new(TaskId::new(), "do the thing", std::env::temp_dir());
    s.task_type = Some(TaskType::Code);
    s.execution = Some(execution);
    s
}

#[tokio::test]
async fn short_circuits_on_timeout_signature_without_calling_the_gateway() {
    let deps = deps_with("this should never be read");
    let mut state = state_with(ExecutionResult::timed_out("process group 123 killed after 120s".to_string()));
    let mut usage = Vec::new();
    audit::run(&mut state, &deps, 1_700_000_000_000, &mut usage).await.expect("audit succeeds");
    assert_eq!(state.verdict, Some(AuditVerdict::Fail));
    assert_eq!(state.retry_count, deps.max_retries);
    assert!(usage.is_empty());
}

#[tokio::test]
async fn does_not_short_circuit_on_permission_denied() {
    let deps = deps_with(r#"{"verdict": "pass"}"#);
    let mut state =
        state_with(ExecutionResult::failed(Some(1), String::new(), "Permission denied".to_string(), String::new()));
    let mut usage = Vec::new();
    audit::run(&mut state, &deps, 1_700_000_000_000, &mut usage).await.expect("audit succeeds");
    assert_eq!(state.verdict, Some(AuditVerdict::Pass));
    assert_eq!(state.retry_count, 0);
}

#[tokio::test]
async fn parses_a_clean_json_verdict() {
    let deps = deps_with(r#"{"verdict": "pass"}"#);
    let mut state = state_with(ExecutionResult::ok("done".to_string(), String::new(), vec![]));
    let mut usage = Vec::new();
    audit::run(&mut state, &deps, 1_700_000_000_000, &mut usage).await.expect("audit succeeds");
    assert_eq!(state.verdict, Some(AuditVerdict::Pass));
}

#[tokio::test]
async fn extracts_a_verdict_from_surrounding_prose_via_balanced_braces() {
    let deps = deps_with("Here is my assessment: {\"verdict\": \"fail\"} based on the stderr.");
    let mut state = state_with(ExecutionResult::ok("done".to_string(), String::new(), vec![]));
    let mut usage = Vec::new();
    audit::run(&mut state, &deps, 1_700_000_000_000, &mut usage).await.expect("audit succeeds");
    assert_eq!(state.verdict, Some(AuditVerdict::Fail));
    assert_eq!(state.retry_count, 1);
}

#[tokio::test]
async fn missing_verdict_defaults_to_fail() {
    let deps = deps_with("I cannot tell if this worked.");
    let mut state = state_with(ExecutionResult::ok("done".to_string(), String::new(), vec![]));
    let mut usage = Vec::new();
    audit::run(&mut state, &deps, 1_700_000_000_000, &mut usage).await.expect("audit succeeds");
    assert_eq!(state.verdict, Some(AuditVerdict::Fail));
}
