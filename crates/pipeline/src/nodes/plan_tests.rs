use std::sync::Arc;

use async_trait::async_trait;
use taskd_core::{ConversationTurn, TaskId};
use taskd_gateway::{CompletionRequest, CompletionResponse, Gateway, GatewayConfig, GatewayError, ModelProvider};
use taskd_runbook::ProjectRegistry;

use super::*;

struct EchoSystemProvider;

#[async_trait]
impl ModelProvider for EchoSystemProvider {
    async fn complete(&self, req: &CompletionRequest) -> Result<CompletionResponse, GatewayError> {
        Ok(CompletionResponse {
            content: req.system.clone().unwrap_or_default(),
            input_tokens: 1,
            output_tokens: 1,
            thinking_tokens: 0,
        })
    }
}

fn deps() -> PipelineDeps {
    let provider: Arc<dyn ModelProvider> = Arc::new(EchoSystemProvider);
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
        max_retries: 2,
        coding_standards_path: None,
        coding_standards_cap_chars: 2000,
        file_injection_cap_chars: 2000,
        exec_timeout_s: 30,
        exec_hard_cap_s: 120,
    }
}

fn state() -> PipelineState {
    PipelineState::new(TaskId::new(), "do the thing", std::env::temp_dir())
}

#[tokio::test]
async fn plan_includes_the_task_type_prompt() {
    let deps = deps();
    let mut state = state();
    state.task_type = Some(TaskType::Data);
    let mut usage = Vec::new();
    run(&mut state, &deps, 1_700_000_000_000, &mut usage).await.expect("plan succeeds");
    assert!(state.plan.unwrap().contains("data analysis"));
}

#[tokio::test]
async fn plan_includes_conversation_history() {
    let deps = deps();
    let mut state = state();
    state.task_type = Some(TaskType::Code);
    state.conversation.push(ConversationTurn { role: "user".to_string(), content: "make it faster".to_string() });
    let mut usage = Vec::new();
    run(&mut state, &deps, 1_700_000_000_000, &mut usage).await.expect("plan succeeds");
    assert!(state.plan.unwrap().contains("make it faster"));
}

#[tokio::test]
async fn retry_uses_high_complexity_and_includes_feedback() {
    let deps = deps();
    let mut state = state();
    state.task_type = Some(TaskType::Code);
    state.retry_count = 1;
    state.audit_feedback = Some("output was empty".to_string());
    let mut usage = Vec::new();
    run(&mut state, &deps, 1_700_000_000_000, &mut usage).await.expect("plan succeeds");
    assert!(state.plan.unwrap().contains("output was empty"));
}
