use std::sync::Arc;

use async_trait::async_trait;
use taskd_core::TaskId;
use taskd_gateway::{CompletionRequest, CompletionResponse, Gateway, GatewayConfig, GatewayError, ModelProvider};
use taskd_runbook::ProjectRegistry;

use super::*;

struct FixedCodeProvider {
    content: String,
}

#[async_trait]
impl ModelProvider for FixedCodeProvider {
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
    let provider: Arc<dyn ModelProvider> = Arc::new(FixedCodeProvider { content: content.to_string() });
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
        exec_timeout_s: 10,
        exec_hard_cap_s: 30,
    }
}

fn state_in(dir: &std::path::Path) -> PipelineState {
    let mut s = PipelineState::new(TaskId::new(), "print a greeting", dir.to_path_buf());
    s.task_type = Some(TaskType::Code);
    s.plan = Some("print hello".to_string());
    s
}

#[tokio::test]
async fn runs_a_generated_bash_script_and_captures_stdout() {
    let dir = tempfile::tempdir().expect("tempdir");
    let deps = deps_with("```bash\necho hello-from-sandbox\n```");
    let mut state = state_in(dir.path());
    let mut usage = Vec::new();
    run(&mut state, &deps, 1_700_000_000_000, &mut usage).await.expect("execute succeeds");
    let execution = state.execution.expect("execution result present");
    assert!(execution.success);
    assert!(execution.stdout.contains("hello-from-sandbox"));
}

#[tokio::test]
async fn refuses_a_blocklisted_command() {
    let dir = tempfile::tempdir().expect("tempdir");
    let deps = deps_with("```bash\nrm -rf ~\n```");
    let mut state = state_in(dir.path());
    let mut usage = Vec::new();
    let result = run(&mut state, &deps, 1_700_000_000_000, &mut usage).await;
    assert!(matches!(result, Err(NodeError::RefusedBySafety(_))));
}
