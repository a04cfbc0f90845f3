use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use taskd_gateway::{CompletionRequest, CompletionResponse, Gateway, GatewayConfig, GatewayError, ModelProvider, RouteContext};
use taskd_runbook::ProjectRegistry;

use super::*;
use crate::config::Config;

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

fn test_coordinator(dir: &std::path::Path, provider: Arc<dyn ModelProvider>) -> Arc<Coordinator> {
    let mut config = Config::from_env().expect("config from env");
    config.state_dir = dir.to_path_buf();
    crate::lifecycle::prepare_directories(&config).expect("prepare directories");

    let (checkpointer, state) = Checkpointer::open(config.wal_path(), config.snapshot_path()).expect("checkpointer");
    let local = Arc::new(LocalProvider::new(config.local_endpoint.clone()));

    let gateway = Arc::new(Gateway::new(
        provider.clone(),
        provider,
        GatewayConfig {
            daily_cap_usd: config.daily_cap_usd(),
            monthly_cap_usd: config.monthly_cap_usd(),
            pricing: config.pricing.clone(),
        },
    ));

    let deps = PipelineDeps {
        gateway,
        registry: Arc::new(ProjectRegistry::empty()),
        sandbox: None,
        route_ctx: RouteContext { local_healthy: false, ram_low: false, spend_ratio: 0.0 },
        live_output: None,
        max_retries: config.max_retries,
        coding_standards_path: None,
        coding_standards_cap_chars: config.coding_standards_cap_chars,
        file_injection_cap_chars: config.file_injection_cap_chars,
        exec_timeout_s: config.exec_timeout_s,
        exec_hard_cap_s: config.exec_hard_cap_s,
    };

    Coordinator::new(Arc::new(config), checkpointer, state, Arc::new(Graph::new()), deps, local)
}

fn idle_coordinator(dir: &std::path::Path) -> Arc<Coordinator> {
    test_coordinator(dir, Arc::new(ScriptedProvider::new(Vec::new())))
}

#[tokio::test]
async fn hello_and_ping_answer_without_touching_storage() {
    let dir = tempfile::tempdir().expect("tempdir");
    let coordinator = idle_coordinator(dir.path());

    assert_eq!(coordinator.dispatch(Request::Ping).await, Response::Pong);
    assert!(matches!(
        coordinator.dispatch(Request::Hello { user_id: "u1".to_string() }).await,
        Response::Hello { .. }
    ));
}

#[tokio::test]
async fn submit_then_status_shows_the_task_pending_or_running() {
    let dir = tempfile::tempdir().expect("tempdir");
    // Scripted so the pipeline never actually completes before we check status.
    let provider: Arc<dyn ModelProvider> = Arc::new(ScriptedProvider::new(Vec::new()));
    let coordinator = test_coordinator(dir.path(), provider);

    let response = coordinator
        .dispatch(Request::Submit { user_id: "u1".to_string(), message: "do a thing".to_string(), files: Vec::new() })
        .await;
    let Response::TaskSubmitted { task } = response else { panic!("expected TaskSubmitted, got {response:?}") };
    assert_eq!(task.status, TaskStatus::Pending);
    assert_eq!(task.message_preview, "do a thing");

    let status = coordinator.dispatch(Request::Status { user_id: "u1".to_string() }).await;
    let Response::Status { tasks } = status else { panic!("expected Status, got {status:?}") };
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, task.id);
}

#[tokio::test]
async fn submit_runs_the_pipeline_to_a_passing_verdict() {
    let dir = tempfile::tempdir().expect("tempdir");
    let provider: Arc<dyn ModelProvider> = Arc::new(ScriptedProvider::new(vec![
        r#"{"task_type": "code"}"#,
        "print a greeting",
        "```bash\necho hello-from-coordinator\n```",
        r#"{"verdict": "pass"}"#,
        "All done, it worked.",
    ]));
    let coordinator = test_coordinator(dir.path(), provider);

    let response = coordinator
        .dispatch(Request::Submit { user_id: "u1".to_string(), message: "print a greeting".to_string(), files: Vec::new() })
        .await;
    let Response::TaskSubmitted { task } = response else { panic!("expected TaskSubmitted, got {response:?}") };

    let mut history = Vec::new();
    for _ in 0..50 {
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        let response = coordinator.dispatch(Request::History { user_id: "u1".to_string(), limit: 10 }).await;
        let Response::History { entries } = response else { panic!("expected History, got {response:?}") };
        if !entries.is_empty() {
            history = entries;
            break;
        }
    }

    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, task.id);
    assert_eq!(history[0].status, TaskStatus::Done);
}

struct NeverRespondingProvider;

#[async_trait]
impl ModelProvider for NeverRespondingProvider {
    async fn complete(&self, _req: &CompletionRequest) -> Result<CompletionResponse, GatewayError> {
        tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
        unreachable!("cancel should abort the task long before this wakes up")
    }
}

#[tokio::test]
async fn cancel_removes_a_still_running_task_from_status() {
    let dir = tempfile::tempdir().expect("tempdir");
    // Blocks forever on the first model call, long enough for the cancel
    // to land before the pipeline ever reaches a terminal state.
    let provider: Arc<dyn ModelProvider> = Arc::new(NeverRespondingProvider);
    let coordinator = test_coordinator(dir.path(), provider);

    let response = coordinator
        .dispatch(Request::Submit { user_id: "u1".to_string(), message: "do a thing".to_string(), files: Vec::new() })
        .await;
    assert!(matches!(response, Response::TaskSubmitted { .. }));

    let cancelled = coordinator.dispatch(Request::Cancel { user_id: "u1".to_string() }).await;
    let Response::Cancelled { cancelled } = cancelled else { panic!("expected Cancelled, got {cancelled:?}") };
    assert_eq!(cancelled.len(), 1);

    let status = coordinator.dispatch(Request::Status { user_id: "u1".to_string() }).await;
    let Response::Status { tasks } = status else { panic!("expected Status, got {status:?}") };
    assert!(tasks.is_empty());
}

#[tokio::test]
async fn schedule_create_list_remove_round_trips() {
    let dir = tempfile::tempdir().expect("tempdir");
    let coordinator = idle_coordinator(dir.path());

    let created = coordinator
        .dispatch(Request::Schedule {
            action: ScheduleAction::Create { interval_s: 3600, target: "build the thing".to_string() },
        })
        .await;
    let Response::ScheduleCreated { entry } = created else { panic!("expected ScheduleCreated, got {created:?}") };

    let listed = coordinator.dispatch(Request::Schedule { action: ScheduleAction::List }).await;
    let Response::Schedules { entries } = listed else { panic!("expected Schedules, got {listed:?}") };
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, entry.id);

    let removed = coordinator
        .dispatch(Request::Schedule { action: ScheduleAction::Remove { id_prefix: entry.id.clone() } })
        .await;
    assert!(matches!(removed, Response::ScheduleRemoved { .. }));

    let listed = coordinator.dispatch(Request::Schedule { action: ScheduleAction::List }).await;
    let Response::Schedules { entries } = listed else { panic!("expected Schedules, got {listed:?}") };
    assert!(entries.is_empty());
}

#[tokio::test]
async fn schedule_remove_on_an_unknown_id_reports_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let coordinator = idle_coordinator(dir.path());

    let response = coordinator
        .dispatch(Request::Schedule { action: ScheduleAction::Remove { id_prefix: "sch-nope".to_string() } })
        .await;
    assert!(matches!(response, Response::Error { .. }));
}

#[tokio::test]
async fn context_clear_hides_turns_recorded_before_it() {
    let dir = tempfile::tempdir().expect("tempdir");
    let provider: Arc<dyn ModelProvider> = Arc::new(ScriptedProvider::new(vec![
        r#"{"task_type": "code"}"#,
        "print a greeting",
        "```bash\necho hi\n```",
        r#"{"verdict": "pass"}"#,
        "All done, it worked.",
    ]));
    let coordinator = test_coordinator(dir.path(), provider);

    coordinator
        .dispatch(Request::Submit { user_id: "u1".to_string(), message: "hi".to_string(), files: Vec::new() })
        .await;

    let mut turns = Vec::new();
    for _ in 0..50 {
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        let response = coordinator.dispatch(Request::Context { user_id: "u1".to_string(), clear: false }).await;
        let Response::Context { turns: found } = response else { panic!("expected Context, got {response:?}") };
        if !found.is_empty() {
            turns = found;
            break;
        }
    }
    assert!(!turns.is_empty());

    let cleared = coordinator.dispatch(Request::Context { user_id: "u1".to_string(), clear: true }).await;
    assert!(matches!(cleared, Response::ContextCleared));

    let after_clear = coordinator.dispatch(Request::Context { user_id: "u1".to_string(), clear: false }).await;
    let Response::Context { turns } = after_clear else { panic!("expected Context, got {after_clear:?}") };
    assert!(turns.is_empty());
}

#[tokio::test]
async fn debug_on_an_unknown_task_prefix_returns_no_sidecar() {
    let dir = tempfile::tempdir().expect("tempdir");
    let coordinator = idle_coordinator(dir.path());

    let response = coordinator.dispatch(Request::Debug { task_id_prefix: "nope".to_string() }).await;
    assert!(matches!(response, Response::Debug { sidecar: None }));
}

#[tokio::test]
async fn list_projects_reflects_an_empty_registry() {
    let dir = tempfile::tempdir().expect("tempdir");
    let coordinator = idle_coordinator(dir.path());

    let response = coordinator.dispatch(Request::ListProjects).await;
    let Response::Projects { projects } = response else { panic!("expected Projects, got {response:?}") };
    assert!(projects.is_empty());
}

#[tokio::test]
async fn cost_and_usage_are_zero_before_any_task_runs() {
    let dir = tempfile::tempdir().expect("tempdir");
    let coordinator = idle_coordinator(dir.path());

    let cost = coordinator.dispatch(Request::Cost).await;
    let Response::Cost { report } = cost else { panic!("expected Cost, got {cost:?}") };
    assert_eq!(report.today_usd, 0.0);
    assert!(report.by_model.is_empty());

    let usage = coordinator.dispatch(Request::Usage { user_id: "u1".to_string() }).await;
    let Response::Usage { totals } = usage else { panic!("expected Usage, got {usage:?}") };
    assert_eq!(totals.input_tokens, 0);
}

#[tokio::test]
async fn shutdown_marks_the_coordinator_as_no_longer_accepting_work() {
    let dir = tempfile::tempdir().expect("tempdir");
    let coordinator = idle_coordinator(dir.path());

    assert!(!coordinator.shutdown_requested());
    let response = coordinator.dispatch(Request::Shutdown).await;
    assert!(matches!(response, Response::ShuttingDown));
    assert!(coordinator.shutdown_requested());
}
