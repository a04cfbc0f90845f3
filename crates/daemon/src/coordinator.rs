// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task Coordinator: the chat front-end's sole entry point. Grounded on
//! the teacher's listener/mutations layer (validate, create a record,
//! emit an event, hand off to a worker) plus its lifecycle reconciliation
//! rule (stale `Running`/`Pending` tasks rewritten to `Crashed` on boot,
//! handled in `crate::lifecycle::recover` before a `Coordinator` exists).

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use parking_lot::Mutex as SyncMutex;
use serde::Deserialize;
use taskd_core::{
    ApiUsageRecord, AuditVerdict, Clock, ConversationHistoryRecord, PipelineState, ProjectMemoryRecord, Role,
    SystemClock, Task, TaskId, TaskStatus, TaskType, TaskdError, TokenUsage,
};
use taskd_gateway::{LocalProvider, ModelPricing, RouteContext};
use taskd_pipeline::{Graph, PipelineDeps};
use taskd_sandbox::{refuse_if_unsafe, LiveOutputBuffer};
use taskd_storage::{Checkpointer, Event, TaskdState};
use taskd_wire::{
    ChainStepResult, ConversationTurnView, CostReport, DebugSidecarView, HealthReport, HistoryEntry, ModelCost,
    ProjectHealth, ProjectSummary, Request, Response, ScheduleAction, ScheduleEntry, TaskDetail, TaskSummary,
    UsageTotals,
};
use tokio::sync::{Mutex as AsyncMutex, Semaphore};

use crate::config::Config;

struct Store {
    checkpointer: Checkpointer,
    state: TaskdState,
}

#[derive(Debug, Deserialize)]
struct SidecarStage {
    name: String,
    duration_ms: u64,
}

/// Mirrors the shape `taskd-pipeline::nodes::deliver` writes to
/// `<working_dir>/outputs/<task_id>.debug.json`. Kept private to this
/// module since the writer's own type is crate-local to the pipeline
/// crate; this is just the read side of the same JSON contract.
#[derive(Debug, Deserialize)]
struct SidecarFile {
    task_id: String,
    message: String,
    task_type: TaskType,
    stages: Vec<SidecarStage>,
    total_duration_ms: u64,
    verdict: Option<AuditVerdict>,
    retry_count: u32,
}

/// Everything the Coordinator needs to turn one `Request` into a
/// `Response`: persisted state behind a single async mutex (teacher
/// precedent: one `Mutex<MaterializedState>`), the pipeline graph, and a
/// concurrency guard capping in-flight tasks.
pub struct Coordinator {
    store: AsyncMutex<Store>,
    graph: Arc<Graph>,
    deps: PipelineDeps,
    local: Arc<LocalProvider>,
    semaphore: Arc<Semaphore>,
    config: Arc<Config>,
    clock: SystemClock,

    abort_handles: SyncMutex<HashMap<TaskId, tokio::task::AbortHandle>>,
    working_dirs: SyncMutex<HashMap<TaskId, PathBuf>>,
    live_outputs: SyncMutex<HashMap<TaskId, Arc<LiveOutputBuffer>>>,
    cleared_at_ms: SyncMutex<HashMap<String, u64>>,
    schedules: SyncMutex<Vec<ScheduleEntry>>,
    last_submit_at: SyncMutex<HashMap<String, u64>>,
    shutdown_requested: AtomicBool,
}

impl Coordinator {
    pub fn new(
        config: Arc<Config>,
        checkpointer: Checkpointer,
        state: TaskdState,
        graph: Arc<Graph>,
        deps: PipelineDeps,
        local: Arc<LocalProvider>,
    ) -> Arc<Self> {
        let semaphore = Arc::new(Semaphore::new(config.max_concurrency));
        Arc::new(Self {
            store: AsyncMutex::new(Store { checkpointer, state }),
            graph,
            deps,
            local,
            semaphore,
            config,
            clock: SystemClock,
            abort_handles: SyncMutex::new(HashMap::new()),
            working_dirs: SyncMutex::new(HashMap::new()),
            live_outputs: SyncMutex::new(HashMap::new()),
            cleared_at_ms: SyncMutex::new(HashMap::new()),
            schedules: SyncMutex::new(Vec::new()),
            last_submit_at: SyncMutex::new(HashMap::new()),
            shutdown_requested: AtomicBool::new(false),
        })
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::Relaxed)
    }

    pub async fn dispatch(self: &Arc<Self>, request: Request) -> Response {
        match request {
            Request::Hello { .. } => Response::Hello { version: env!("CARGO_PKG_VERSION").to_string() },
            Request::Ping => Response::Pong,
            Request::Shutdown => {
                self.shutdown_requested.store(true, Ordering::Relaxed);
                let mut store = self.store.lock().await;
                let _ = store.checkpointer.append(&mut store.state, Event::Shutdown);
                let _ = store.checkpointer.checkpoint(&store.state);
                Response::ShuttingDown
            }
            Request::Submit { user_id, message, files } => self.handle_submit(user_id, message, files).await,
            Request::Status { user_id } => self.handle_status(&user_id).await,
            Request::History { user_id, limit } => self.handle_history(&user_id, limit).await,
            Request::Task { user_id, task_id_prefix } => self.handle_task_detail(&user_id, &task_id_prefix).await,
            Request::Usage { user_id } => self.handle_usage(&user_id).await,
            Request::Cost => self.handle_cost().await,
            Request::Health => self.handle_health().await,
            Request::Exec { user_id, command } => self.handle_exec(&user_id, &command).await,
            Request::Context { user_id, clear } => self.handle_context(&user_id, clear).await,
            Request::Cancel { user_id } => self.handle_cancel(&user_id).await,
            Request::ListProjects => self.handle_list_projects(),
            Request::Schedule { action } => self.handle_schedule(action),
            Request::Chain { user_id, steps } => self.handle_chain(user_id, steps).await,
            Request::Debug { task_id_prefix } => self.handle_debug(&task_id_prefix),
        }
    }

    /// Resolve the moment's routing context (local-model health, RAM
    /// pressure, spend ratio) and clone it into a fresh `PipelineDeps`.
    /// `route_ctx` reflects the moment, not the daemon's static config, so
    /// it is rebuilt for every call rather than cached on `self.deps`.
    async fn current_deps(&self) -> PipelineDeps {
        let local_healthy = self.local.is_healthy().await;
        let ram_low = ram_pressure_high(self.config.ram_threshold_pct);
        let spend_ratio = {
            let store = self.store.lock().await;
            let (day, _month) = summarize_spend(&store.state.api_usage, &self.config.pricing, self.clock.epoch_ms());
            day / self.config.daily_cap_usd().max(0.01)
        };
        let mut deps = self.deps.clone();
        deps.route_ctx = RouteContext { local_healthy, ram_low, spend_ratio };
        deps
    }

    async fn recent_tasks_for(&self, user_id: &str, exclude: TaskId) -> Vec<Task> {
        let store = self.store.lock().await;
        store.state.tasks.values().filter(|t| t.user_id == user_id && t.id != exclude).cloned().collect()
    }

    /// Resource guards: per-user cooldown, concurrency cap, RAM threshold.
    /// All three run before a task record is created — a rejected submit
    /// leaves no trace in the task list.
    fn admission_guard(&self, user_id: &str, now_ms: u64) -> Result<(), TaskdError> {
        let mut last_submit = self.last_submit_at.lock();
        if let Some(&prev_ms) = last_submit.get(user_id) {
            let cooldown_ms = self.config.submit_cooldown_s * 1_000;
            let elapsed_ms = now_ms.saturating_sub(prev_ms);
            if elapsed_ms < cooldown_ms {
                let remaining_s = (cooldown_ms - elapsed_ms).div_ceil(1_000);
                return Err(TaskdError::GuardRejected(format!("per-user cooldown: try again in {remaining_s}s")));
            }
        }

        if self.semaphore.available_permits() == 0 {
            return Err(TaskdError::GuardRejected(format!(
                "concurrency cap reached: {} tasks already in flight",
                self.config.max_concurrency
            )));
        }

        if ram_pressure_high(self.config.ram_threshold_pct) {
            return Err(TaskdError::GuardRejected(format!(
                "RAM pressure at or above {:.0}%",
                self.config.ram_threshold_pct
            )));
        }

        last_submit.insert(user_id.to_string(), now_ms);
        Ok(())
    }

    async fn handle_submit(self: &Arc<Self>, user_id: String, message: String, files: Vec<PathBuf>) -> Response {
        let now_ms = self.clock.epoch_ms();

        if let Err(e) = self.admission_guard(&user_id, now_ms) {
            return Response::Error { message: e.sanitized() };
        }

        let mut task = Task::new(user_id.clone(), message.clone(), now_ms);
        task.files = files.clone();
        let task_id = task.id;

        {
            let mut store = self.store.lock().await;
            if let Err(e) = store.checkpointer.append(&mut store.state, Event::TaskCreated { task: task.clone() }) {
                return Response::Error { message: format!("failed to persist task: {e}") };
            }
        }

        let working_dir = self.config.task_workdir(task_id.suffix());
        if let Err(e) = tokio::fs::create_dir_all(&working_dir).await {
            return Response::Error { message: format!("failed to create working directory: {e}") };
        }
        self.working_dirs.lock().insert(task_id, working_dir.clone());
        let live = LiveOutputBuffer::new();
        self.live_outputs.lock().insert(task_id, live.clone());

        // Guarded above by `available_permits`, so this acquire is
        // immediate; it never queues an over-cap submission.
        let permit = match self.semaphore.clone().try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => return Response::Error { message: "coordinator is shutting down".to_string() },
        };

        let message_preview = preview(&message);

        let coordinator = self.clone();
        let mut deps = self.current_deps().await;
        deps.live_output = Some(live);
        let handle = tokio::spawn(async move {
            let _permit = permit;
            coordinator.run_task(task_id, user_id, message, files, working_dir, deps).await;
        });
        self.abort_handles.lock().insert(task_id, handle.abort_handle());

        Response::TaskSubmitted {
            task: TaskSummary {
                id: task_id,
                status: TaskStatus::Pending,
                task_type: None,
                stage: None,
                live_tail: Vec::new(),
                created_at_ms: now_ms,
                message_preview,
            },
        }
    }

    /// Runs one task to completion and persists every fact the pipeline
    /// produced. Used directly by `Submit` (spawned) and by `Chain` (run
    /// inline, one step at a time).
    async fn run_task(
        self: Arc<Self>,
        task_id: TaskId,
        user_id: String,
        message: String,
        files: Vec<PathBuf>,
        working_dir: PathBuf,
        deps: PipelineDeps,
    ) -> PipelineState {
        {
            let mut store = self.store.lock().await;
            let _ = store.checkpointer.append(&mut store.state, Event::TaskStatusChanged {
                task_id,
                status: TaskStatus::Running,
            });
        }

        let mut state = PipelineState::new(task_id, message.clone(), working_dir);
        state.files = files;

        let recent_tasks = self.recent_tasks_for(&user_id, task_id).await;
        let mut usage: Vec<ApiUsageRecord> = Vec::new();
        let result = self.graph.run(&mut state, &deps, &self.clock, &mut usage, &recent_tasks).await;

        let now_ms = self.clock.epoch_ms();
        let mut store = self.store.lock().await;
        for record in &usage {
            let _ = store.checkpointer.append(&mut store.state, Event::ApiUsageRecorded { record: record.clone() });
        }

        let _ = store.checkpointer.append(&mut store.state, Event::ConversationAppended {
            record: ConversationHistoryRecord {
                task_id,
                user_id: user_id.clone(),
                role: Role::User,
                content: message,
                recorded_at_ms: now_ms,
            },
        });

        let total_usage = usage.iter().fold(TokenUsage::default(), |mut acc, r| {
            acc.add(TokenUsage { input: r.input_tokens, output: r.output_tokens, thinking: r.thinking_tokens });
            acc
        });

        match &result {
            Ok(memory) => {
                let passed = state.verdict == Some(AuditVerdict::Pass);
                let status = if passed { TaskStatus::Done } else { TaskStatus::Failed };
                if let Some(response) = &state.response {
                    let _ = store.checkpointer.append(&mut store.state, Event::ConversationAppended {
                        record: ConversationHistoryRecord {
                            task_id,
                            user_id,
                            role: Role::Assistant,
                            content: response.clone(),
                            recorded_at_ms: now_ms,
                        },
                    });
                }
                let _ = store.checkpointer.append(&mut store.state, Event::TaskCompleted {
                    task_id,
                    status,
                    result: state.response.clone(),
                    error: if passed { None } else { state.audit_feedback.clone() },
                    completed_at_ms: now_ms,
                    usage: total_usage,
                });
                if let Some(record) = memory.clone() {
                    let _ = store.checkpointer.append(&mut store.state, Event::ProjectMemoryRecorded { record });
                }
            }
            Err(e) => {
                let _ = store.checkpointer.append(&mut store.state, Event::TaskCompleted {
                    task_id,
                    status: TaskStatus::Failed,
                    result: None,
                    error: Some(e.to_string()),
                    completed_at_ms: now_ms,
                    usage: total_usage,
                });
            }
        }
        drop(store);
        self.abort_handles.lock().remove(&task_id);
        state
    }

    async fn handle_status(&self, user_id: &str) -> Response {
        let store = self.store.lock().await;
        let live_outputs = self.live_outputs.lock();
        let tasks = store
            .state
            .tasks
            .values()
            .filter(|t| t.user_id == user_id && !t.status.is_terminal())
            .map(|t| TaskSummary {
                id: t.id,
                status: t.status,
                task_type: t.task_type,
                stage: self.graph.current_stage(t.id).map(|s| s.as_str().to_string()),
                live_tail: live_outputs.get(&t.id).map(|buf| buf.tail(3)).unwrap_or_default(),
                created_at_ms: t.created_at_ms,
                message_preview: preview(&t.message),
            })
            .collect();
        Response::Status { tasks }
    }

    async fn handle_history(&self, user_id: &str, limit: usize) -> Response {
        let store = self.store.lock().await;
        let mut entries: Vec<HistoryEntry> = store
            .state
            .tasks
            .values()
            .filter(|t| t.user_id == user_id && t.status.is_terminal())
            .map(|t| HistoryEntry {
                id: t.id,
                status: t.status,
                task_type: t.task_type,
                created_at_ms: t.created_at_ms,
                completed_at_ms: t.completed_at_ms,
                duration_ms: t.completed_at_ms.map(|c| c.saturating_sub(t.created_at_ms)),
            })
            .collect();
        entries.sort_by(|a, b| b.created_at_ms.cmp(&a.created_at_ms));
        entries.truncate(limit);
        Response::History { entries }
    }

    /// `retry_count` is always 0: it lives on the in-flight
    /// `PipelineState`, not on the persisted `Task`.
    async fn handle_task_detail(&self, user_id: &str, task_id_prefix: &str) -> Response {
        let store = self.store.lock().await;
        let task = store
            .state
            .tasks
            .values()
            .find(|t| t.user_id == user_id && t.id.suffix().starts_with(task_id_prefix));
        let live_output =
            task.and_then(|t| self.live_outputs.lock().get(&t.id).map(|buf| buf.snapshot())).unwrap_or_default();

        Response::TaskDetail {
            task: task.map(|t| {
                Box::new(TaskDetail {
                    id: t.id,
                    status: t.status,
                    task_type: t.task_type,
                    message: t.message.clone(),
                    created_at_ms: t.created_at_ms,
                    completed_at_ms: t.completed_at_ms,
                    result: t.result.clone(),
                    error: t.error.clone(),
                    usage: t.usage,
                    retry_count: 0,
                    live_output,
                })
            }),
        }
    }

    async fn handle_usage(&self, user_id: &str) -> Response {
        let store = self.store.lock().await;
        let mut totals = UsageTotals::default();
        for record in &store.state.api_usage {
            let belongs_to_user = store.state.tasks.get(&record.task_id).map(|t| t.user_id == user_id).unwrap_or(false);
            if belongs_to_user {
                totals.input_tokens += record.input_tokens;
                totals.output_tokens += record.output_tokens;
                totals.thinking_tokens += record.thinking_tokens;
            }
        }
        Response::Usage { totals }
    }

    async fn handle_cost(&self) -> Response {
        let store = self.store.lock().await;
        let now_ms = self.clock.epoch_ms();
        let (today_usd, month_usd) = summarize_spend(&store.state.api_usage, &self.config.pricing, now_ms);

        let mut by_model: HashMap<String, ModelCost> = HashMap::new();
        for record in &store.state.api_usage {
            let entry = by_model.entry(record.model.clone()).or_insert_with(|| ModelCost {
                model: record.model.clone(),
                input_tokens: 0,
                output_tokens: 0,
                thinking_tokens: 0,
                cost_usd: 0.0,
            });
            entry.input_tokens += record.input_tokens;
            entry.output_tokens += record.output_tokens;
            entry.thinking_tokens += record.thinking_tokens;
            entry.cost_usd += cost_of(record, &self.config.pricing);
        }

        Response::Cost {
            report: CostReport { today_usd, month_usd, by_model: by_model.into_values().collect() },
        }
    }

    async fn handle_health(&self) -> Response {
        let store = self.store.lock().await;
        let now_ms = self.clock.epoch_ms();
        let today_start_ms = start_of_utc_day(now_ms);
        let api_calls_today =
            store.state.api_usage.iter().filter(|r| r.recorded_at_ms >= today_start_ms).count() as u64;
        let in_flight_count = store.state.tasks.values().filter(|t| !t.status.is_terminal()).count();
        let container_backend_available = match &self.deps.sandbox {
            Some(backend) => backend.is_available().await,
            None => false,
        };
        let projects = self
            .deps
            .registry
            .projects()
            .iter()
            .map(|p| ProjectHealth { name: p.name.clone(), path_exists: p.path.exists() })
            .collect();

        Response::Health {
            report: HealthReport {
                ram_available_mb: ram_available_mb(),
                disk_free_mb: disk_free_mb(&self.config.state_dir),
                local_model_available: self.local.is_healthy().await,
                container_backend_available,
                in_flight_count,
                api_calls_today,
                projects,
            },
        }
    }

    async fn handle_exec(&self, user_id: &str, command: &str) -> Response {
        if let Err(e) = refuse_if_unsafe(command, self.deps.sandbox.is_some()) {
            return Response::Error { message: e.to_string() };
        }
        let cwd = self.config.task_workdir(&format!("exec-{user_id}"));
        if let Err(e) = tokio::fs::create_dir_all(&cwd).await {
            return Response::Error { message: format!("failed to create exec scratch dir: {e}") };
        }
        let env = taskd_sandbox::env_strip::child_env(&HashMap::new());
        let timeout = std::time::Duration::from_secs(self.config.exec_timeout_s);
        match taskd_sandbox::subprocess::run("bash", &["-c".to_string(), command.to_string()], &cwd, &env, timeout, None)
            .await
        {
            Ok(result) => Response::ExecResult {
                exit_code: result.exit_code,
                stdout: result.stdout,
                stderr: result.stderr,
            },
            Err(e) => Response::Error { message: e.to_string() },
        }
    }

    async fn handle_context(&self, user_id: &str, clear: bool) -> Response {
        if clear {
            self.cleared_at_ms.lock().insert(user_id.to_string(), self.clock.epoch_ms());
            return Response::ContextCleared;
        }
        let since_ms = self.cleared_at_ms.lock().get(user_id).copied().unwrap_or(0);
        let store = self.store.lock().await;
        let mut turns: Vec<(u64, ConversationTurnView)> = store
            .state
            .conversation_history
            .iter()
            .filter(|r| r.user_id == user_id && r.recorded_at_ms >= since_ms)
            .map(|r| {
                (
                    r.recorded_at_ms,
                    ConversationTurnView {
                        role: match r.role {
                            Role::User => "user".to_string(),
                            Role::Assistant => "assistant".to_string(),
                        },
                        content: r.content.clone(),
                    },
                )
            })
            .collect();
        turns.sort_by_key(|(ms, _)| *ms);
        Response::Context { turns: turns.into_iter().map(|(_, turn)| turn).collect() }
    }

    async fn handle_cancel(&self, user_id: &str) -> Response {
        let candidate_ids: Vec<TaskId> = {
            let store = self.store.lock().await;
            store
                .state
                .tasks
                .values()
                .filter(|t| t.user_id == user_id && !t.status.is_terminal())
                .map(|t| t.id)
                .collect()
        };

        let mut cancelled = Vec::new();
        for task_id in candidate_ids {
            let handle = self.abort_handles.lock().remove(&task_id);
            if let Some(handle) = handle {
                handle.abort();
            }
            let mut store = self.store.lock().await;
            if store
                .checkpointer
                .append(&mut store.state, Event::TaskStatusChanged { task_id, status: TaskStatus::Cancelled })
                .is_ok()
            {
                cancelled.push(task_id);
            }
        }
        Response::Cancelled { cancelled }
    }

    fn handle_list_projects(&self) -> Response {
        let projects = self
            .deps
            .registry
            .projects()
            .iter()
            .map(|p| ProjectSummary {
                name: p.name.clone(),
                path: p.path.display().to_string(),
                description: p.description.clone(),
                trigger_count: p.triggers.len(),
            })
            .collect();
        Response::Projects { projects }
    }

    fn handle_schedule(&self, action: ScheduleAction) -> Response {
        match action {
            ScheduleAction::Create { interval_s, target } => {
                let entry = ScheduleEntry {
                    id: format!("sch-{}", TaskId::new().suffix()),
                    interval_s,
                    target,
                    created_at_ms: self.clock.epoch_ms(),
                };
                self.schedules.lock().push(entry.clone());
                Response::ScheduleCreated { entry }
            }
            ScheduleAction::List => Response::Schedules { entries: self.schedules.lock().clone() },
            ScheduleAction::Remove { id_prefix } => {
                let mut schedules = self.schedules.lock();
                let before = schedules.len();
                schedules.retain(|entry| !entry.id.starts_with(&id_prefix));
                if schedules.len() == before {
                    Response::Error { message: format!("no schedule matching {id_prefix}") }
                } else {
                    Response::ScheduleRemoved { id: id_prefix }
                }
            }
        }
    }

    /// Runs each step in strict sequence, substituting `{output}` with the
    /// previous step's first artifact path, stopping at the first failure.
    async fn handle_chain(self: &Arc<Self>, user_id: String, steps: Vec<String>) -> Response {
        let mut results = Vec::new();
        let mut failed_at = None;
        let mut previous_artifact: Option<String> = None;

        for (index, raw_step) in steps.into_iter().enumerate() {
            let message = match &previous_artifact {
                Some(path) => raw_step.replace("{output}", path),
                None => raw_step,
            };

            let now_ms = self.clock.epoch_ms();
            let mut task = Task::new(user_id.clone(), message.clone(), now_ms);
            let task_id = task.id;
            task.set_status(TaskStatus::Running);

            {
                let mut store = self.store.lock().await;
                if let Err(e) = store.checkpointer.append(&mut store.state, Event::TaskCreated { task }) {
                    return Response::Error { message: format!("failed to persist chain step: {e}") };
                }
            }

            let working_dir = self.config.task_workdir(task_id.suffix());
            if let Err(e) = tokio::fs::create_dir_all(&working_dir).await {
                return Response::Error { message: format!("failed to create working directory: {e}") };
            }
            self.working_dirs.lock().insert(task_id, working_dir.clone());
            let live = LiveOutputBuffer::new();
            self.live_outputs.lock().insert(task_id, live.clone());

            let mut deps = self.current_deps().await;
            deps.live_output = Some(live);
            let state = self
                .clone()
                .run_task(task_id, user_id.clone(), message, Vec::new(), working_dir, deps)
                .await;

            let passed = state.verdict == Some(AuditVerdict::Pass);
            let artifact_path = state.artifacts.first().map(|p| p.display().to_string());
            results.push(ChainStepResult { step_index: index, task_id, passed, artifact_path: artifact_path.clone() });

            if !passed {
                failed_at = Some(index);
                break;
            }
            previous_artifact = artifact_path;
        }

        Response::ChainResult { steps: results, failed_at }
    }

    fn handle_debug(&self, task_id_prefix: &str) -> Response {
        let working_dirs = self.working_dirs.lock();
        let Some((task_id, working_dir)) =
            working_dirs.iter().find(|(id, _)| id.suffix().starts_with(task_id_prefix)).map(|(id, dir)| (*id, dir.clone()))
        else {
            return Response::Debug { sidecar: None };
        };
        drop(working_dirs);

        let path = working_dir.join("outputs").join(format!("{task_id}.debug.json"));
        let Ok(contents) = std::fs::read_to_string(&path) else {
            return Response::Debug { sidecar: None };
        };
        let Ok(sidecar) = serde_json::from_str::<SidecarFile>(&contents) else {
            return Response::Debug { sidecar: None };
        };

        Response::Debug {
            sidecar: Some(Box::new(DebugSidecarView {
                task_id: TaskId::from_string(&sidecar.task_id),
                message: sidecar.message,
                task_type: Some(sidecar.task_type),
                stage_durations_ms: sidecar.stages.into_iter().map(|s| (s.name, s.duration_ms)).collect(),
                total_duration_ms: sidecar.total_duration_ms,
                verdict: sidecar.verdict.map(|v| format!("{v:?}").to_lowercase()),
                retry_count: sidecar.retry_count,
            })),
        }
    }
}

fn preview(message: &str) -> String {
    const PREVIEW_CHARS: usize = 80;
    let truncated: String = message.chars().take(PREVIEW_CHARS).collect();
    if message.chars().count() > PREVIEW_CHARS {
        format!("{truncated}\u{2026}")
    } else {
        truncated
    }
}

/// `GatewayConfig`'s cost formula, duplicated here because
/// `taskd_gateway::budget` is a private module (its sum types are
/// re-exported, its pure functions are not). Thinking tokens are priced
/// as output tokens, matching the Gateway's own ledger.
fn cost_of(record: &ApiUsageRecord, pricing: &HashMap<String, ModelPricing>) -> f64 {
    let Some(p) = pricing.get(&record.model) else { return 0.0 };
    let input_cost = record.input_tokens as f64 / 1_000_000.0 * p.input_per_million_usd;
    let output_cost =
        (record.output_tokens + record.thinking_tokens) as f64 / 1_000_000.0 * p.output_per_million_usd;
    input_cost + output_cost
}

fn start_of_utc_day(now_ms: u64) -> u64 {
    let now = DateTime::<Utc>::from_timestamp_millis(now_ms as i64).unwrap_or_else(Utc::now);
    now.date_naive().and_hms_opt(0, 0, 0).unwrap_or_default().and_utc().timestamp_millis() as u64
}

fn summarize_spend(records: &[ApiUsageRecord], pricing: &HashMap<String, ModelPricing>, now_ms: u64) -> (f64, f64) {
    let now = DateTime::<Utc>::from_timestamp_millis(now_ms as i64).unwrap_or_else(Utc::now);
    let today = now.date_naive();
    let (this_year, this_month) = (now.year(), now.month());

    let mut day_spend = 0.0;
    let mut month_spend = 0.0;
    for record in records {
        let Some(recorded_at) = DateTime::<Utc>::from_timestamp_millis(record.recorded_at_ms as i64) else {
            continue;
        };
        let cost = cost_of(record, pricing);
        if recorded_at.year() == this_year && recorded_at.month() == this_month {
            month_spend += cost;
            if recorded_at.date_naive() == today {
                day_spend += cost;
            }
        }
    }
    (day_spend, month_spend)
}

/// `true` when used RAM is at or above `threshold_pct`. Reads
/// `/proc/meminfo` directly; unavailable (non-Linux, sandboxed) simply
/// reports no pressure rather than failing the call that needed routing
/// context.
fn ram_pressure_high(threshold_pct: f64) -> bool {
    let Ok(contents) = std::fs::read_to_string("/proc/meminfo") else { return false };
    let mut total_kb = None;
    let mut avail_kb = None;
    for line in contents.lines() {
        if let Some(rest) = line.strip_prefix("MemTotal:") {
            total_kb = rest.trim().split_whitespace().next().and_then(|s| s.parse::<f64>().ok());
        } else if let Some(rest) = line.strip_prefix("MemAvailable:") {
            avail_kb = rest.trim().split_whitespace().next().and_then(|s| s.parse::<f64>().ok());
        }
    }
    match (total_kb, avail_kb) {
        (Some(total), Some(avail)) if total > 0.0 => (total - avail) / total * 100.0 >= threshold_pct,
        _ => false,
    }
}

fn ram_available_mb() -> u64 {
    let Ok(contents) = std::fs::read_to_string("/proc/meminfo") else { return 0 };
    contents
        .lines()
        .find_map(|line| line.strip_prefix("MemAvailable:"))
        .and_then(|rest| rest.trim().split_whitespace().next())
        .and_then(|s| s.parse::<u64>().ok())
        .map(|kb| kb / 1024)
        .unwrap_or(0)
}

fn disk_free_mb(path: &std::path::Path) -> u64 {
    fs2::available_space(path).map(|bytes| bytes / (1024 * 1024)).unwrap_or(0)
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
