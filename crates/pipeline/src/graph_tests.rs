use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use taskd_core::{FakeClock, TaskId};
use taskd_gateway::{CompletionRequest, CompletionResponse, Gateway, GatewayConfig, GatewayError, ModelProvider};
use taskd_runbook::ProjectRegistry;

use super::*;

struct ScriptedProvider {
    responses: Vec<String>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    fn new(responses: Vec<&str>) -> Self {
        Self { responses: responses.into_iter().map(str::to_string).collect(), calls: AtomicUsize::new(0) }
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    async fn complete(&self, _req: &CompletionRequest) -> Result<CompletionResponse, GatewayError> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        let content = self
            .responses
            .get(index)
            .unwrap_or_else(|| panic!("no scripted response for call {index}"))
            .clone();
        Ok(CompletionResponse { content, input_tokens: 1, output_tokens: 1, thinking_tokens: 0 })
    }
}

fn deps_with(provider: Arc<dyn ModelProvider>) -> PipelineDeps {
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

#[tokio::test]
async fn runs_classify_through_deliver_on_the_first_attempt() {
    let dir = tempfile::tempdir().expect("tempdir");
    let provider: Arc<dyn ModelProvider> = Arc::new(ScriptedProvider::new(vec![
        r#"{"task_type": "code"}"#,
        "print a greeting",
        "```bash\necho hello-from-graph\n```",
        r#"{"verdict": "pass"}"#,
        "All done, it worked.",
    ]));
    let deps = deps_with(provider);
    let clock = FakeClock::new();
    let graph = Graph::new();
    let mut state = PipelineState::new(TaskId::new(), "print a greeting", dir.path().to_path_buf());
    let mut usage = Vec::new();

    let memory = graph.run(&mut state, &deps, &clock, &mut usage, &[]).await.expect("graph run succeeds");

    assert!(memory.is_none());
    assert_eq!(state.verdict, Some(AuditVerdict::Pass));
    assert_eq!(state.retry_count, 0);
    assert!(state.response.unwrap().contains("worked"));
    assert_eq!(state.timings.len(), 5);
    assert!(graph.current_stage(state.task_id).is_none());
}

#[tokio::test]
async fn loops_back_to_plan_on_a_failed_audit_then_delivers() {
    let dir = tempfile::tempdir().expect("tempdir");
    let provider: Arc<dyn ModelProvider> = Arc::new(ScriptedProvider::new(vec![
        r#"{"task_type": "code"}"#,
        "print a greeting",
        "```bash\nexit 1\n```",
        r#"{"verdict": "fail"}"#,
        "retry with a fix",
        "```bash\necho hello-from-retry\n```",
        r#"{"verdict": "pass"}"#,
        "All done on the second try.",
    ]));
    let deps = deps_with(provider);
    let clock = FakeClock::new();
    let graph = Graph::new();
    let mut state = PipelineState::new(TaskId::new(), "print a greeting", dir.path().to_path_buf());
    let mut usage = Vec::new();

    graph.run(&mut state, &deps, &clock, &mut usage, &[]).await.expect("graph run succeeds");

    assert_eq!(state.verdict, Some(AuditVerdict::Pass));
    assert_eq!(state.retry_count, 1);
    assert_eq!(state.timings.len(), 8);
}
