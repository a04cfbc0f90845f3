// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One request, one response, over the daemon's Unix socket. Mirrors
//! the teacher's `DaemonClient`: a thin connection plus one typed
//! method per `Request` variant, each rejecting any `Response` other
//! than the one it expects.

use std::path::PathBuf;
use std::time::Duration;

use taskd_wire::{ChainStepResult, CostReport, HealthReport, HistoryEntry, ProjectSummary, Request, Response,
    ScheduleAction, ScheduleEntry, TaskSummary, UsageTotals};
use tokio::net::UnixStream;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("cannot resolve a state directory: no TASKD_STATE_DIR, XDG_STATE_HOME, or HOME set")]
    NoStateDir,
    #[error("daemon is not running at {0}")]
    NotRunning(PathBuf),
    #[error(transparent)]
    Protocol(#[from] taskd_wire::ProtocolError),
    #[error("unexpected response from daemon: {0:?}")]
    UnexpectedResponse(Response),
    #[error("daemon reported an error: {0}")]
    DaemonError(String),
}

impl ClientError {
    pub fn is_not_running(&self) -> bool {
        matches!(self, ClientError::NotRunning(_))
    }
}

/// `TASKD_STATE_DIR` > `XDG_STATE_HOME/taskd` > `~/.local/state/taskd`,
/// same fallback chain as the daemon's own `config::state_dir`. Kept
/// independent of `taskd-daemon` so the CLI doesn't pull in the pipeline,
/// gateway, and storage stack just to find a socket.
pub fn state_dir() -> Result<PathBuf, ClientError> {
    if let Ok(dir) = std::env::var("TASKD_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("taskd"));
    }
    let home = dirs::home_dir().ok_or(ClientError::NoStateDir)?;
    Ok(home.join(".local/state/taskd"))
}

pub fn socket_path() -> Result<PathBuf, ClientError> {
    Ok(state_dir()?.join("taskd.sock"))
}

/// `TASKD_USER`, or the single default operator. This is a single-operator
/// service; the user id exists to key conversation history and spend, not
/// to gate access.
pub fn default_user_id() -> String {
    std::env::var("TASKD_USER").unwrap_or_else(|_| "operator".to_string())
}

pub struct DaemonClient {
    stream: UnixStream,
}

impl DaemonClient {
    pub async fn connect() -> Result<Self, ClientError> {
        let path = socket_path()?;
        let stream = UnixStream::connect(&path).await.map_err(|_| ClientError::NotRunning(path))?;
        Ok(Self { stream })
    }

    /// Connect, starting the daemon in the background and retrying for a
    /// few seconds if nothing is listening yet.
    pub async fn connect_or_start() -> Result<Self, ClientError> {
        if let Ok(client) = Self::connect().await {
            return Ok(client);
        }
        spawn_daemon()?;

        let path = socket_path()?;
        for _ in 0..50 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            if let Ok(stream) = UnixStream::connect(&path).await {
                return Ok(Self { stream });
            }
        }
        Err(ClientError::NotRunning(path))
    }

    async fn send(&mut self, request: &Request) -> Result<Response, ClientError> {
        let bytes = taskd_wire::encode(request)?;
        taskd_wire::write_message(&mut self.stream, &bytes).await?;
        let bytes = taskd_wire::read_message(&mut self.stream).await?;
        let response: Response = taskd_wire::decode(&bytes)?;
        if let Response::Error { message } = response {
            return Err(ClientError::DaemonError(message));
        }
        Ok(response)
    }

    fn reject<T>(other: Response) -> Result<T, ClientError> {
        Err(ClientError::UnexpectedResponse(other))
    }

    pub async fn hello(&mut self) -> Result<String, ClientError> {
        let request = Request::Hello { version: env!("CARGO_PKG_VERSION").to_string() };
        match self.send(&request).await? {
            Response::Hello { version } => Ok(version),
            other => Self::reject(other),
        }
    }

    pub async fn ping(&mut self) -> Result<(), ClientError> {
        match self.send(&Request::Ping).await? {
            Response::Pong => Ok(()),
            other => Self::reject(other),
        }
    }

    pub async fn shutdown(&mut self) -> Result<(), ClientError> {
        match self.send(&Request::Shutdown).await? {
            Response::ShuttingDown => Ok(()),
            other => Self::reject(other),
        }
    }

    pub async fn submit(
        &mut self,
        user_id: impl Into<String>,
        message: impl Into<String>,
        files: Vec<PathBuf>,
    ) -> Result<TaskSummary, ClientError> {
        let request = Request::Submit { user_id: user_id.into(), message: message.into(), files };
        match self.send(&request).await? {
            Response::TaskSubmitted { task } => Ok(task),
            other => Self::reject(other),
        }
    }

    pub async fn status(&mut self, user_id: impl Into<String>) -> Result<Vec<TaskSummary>, ClientError> {
        match self.send(&Request::Status { user_id: user_id.into() }).await? {
            Response::Status { tasks } => Ok(tasks),
            other => Self::reject(other),
        }
    }

    pub async fn history(
        &mut self,
        user_id: impl Into<String>,
        limit: usize,
    ) -> Result<Vec<HistoryEntry>, ClientError> {
        match self.send(&Request::History { user_id: user_id.into(), limit }).await? {
            Response::History { entries } => Ok(entries),
            other => Self::reject(other),
        }
    }

    pub async fn task_detail(
        &mut self,
        user_id: impl Into<String>,
        task_id_prefix: impl Into<String>,
    ) -> Result<Option<Box<taskd_wire::TaskDetail>>, ClientError> {
        let request = Request::Task { user_id: user_id.into(), task_id_prefix: task_id_prefix.into() };
        match self.send(&request).await? {
            Response::TaskDetail { task } => Ok(task),
            other => Self::reject(other),
        }
    }

    pub async fn usage(&mut self, user_id: impl Into<String>) -> Result<UsageTotals, ClientError> {
        match self.send(&Request::Usage { user_id: user_id.into() }).await? {
            Response::Usage { totals } => Ok(totals),
            other => Self::reject(other),
        }
    }

    pub async fn cost(&mut self) -> Result<CostReport, ClientError> {
        match self.send(&Request::Cost).await? {
            Response::Cost { report } => Ok(report),
            other => Self::reject(other),
        }
    }

    pub async fn health(&mut self) -> Result<HealthReport, ClientError> {
        match self.send(&Request::Health).await? {
            Response::Health { report } => Ok(report),
            other => Self::reject(other),
        }
    }

    pub async fn exec(
        &mut self,
        user_id: impl Into<String>,
        command: impl Into<String>,
    ) -> Result<(Option<i32>, String, String), ClientError> {
        let request = Request::Exec { user_id: user_id.into(), command: command.into() };
        match self.send(&request).await? {
            Response::ExecResult { exit_code, stdout, stderr } => Ok((exit_code, stdout, stderr)),
            other => Self::reject(other),
        }
    }

    pub async fn context(
        &mut self,
        user_id: impl Into<String>,
        clear: bool,
    ) -> Result<Vec<taskd_wire::ConversationTurnView>, ClientError> {
        let request = Request::Context { user_id: user_id.into(), clear };
        match self.send(&request).await? {
            Response::Context { turns } => Ok(turns),
            Response::ContextCleared => Ok(Vec::new()),
            other => Self::reject(other),
        }
    }

    pub async fn cancel(&mut self, user_id: impl Into<String>) -> Result<Vec<taskd_core::TaskId>, ClientError> {
        match self.send(&Request::Cancel { user_id: user_id.into() }).await? {
            Response::Cancelled { cancelled } => Ok(cancelled),
            other => Self::reject(other),
        }
    }

    pub async fn list_projects(&mut self) -> Result<Vec<ProjectSummary>, ClientError> {
        match self.send(&Request::ListProjects).await? {
            Response::Projects { projects } => Ok(projects),
            other => Self::reject(other),
        }
    }

    pub async fn schedule_create(
        &mut self,
        interval_s: u64,
        target: impl Into<String>,
    ) -> Result<ScheduleEntry, ClientError> {
        let action = ScheduleAction::Create { interval_s, target: target.into() };
        match self.send(&Request::Schedule { action }).await? {
            Response::ScheduleCreated { entry } => Ok(entry),
            other => Self::reject(other),
        }
    }

    pub async fn schedule_list(&mut self) -> Result<Vec<ScheduleEntry>, ClientError> {
        match self.send(&Request::Schedule { action: ScheduleAction::List }).await? {
            Response::Schedules { entries } => Ok(entries),
            other => Self::reject(other),
        }
    }

    pub async fn schedule_remove(&mut self, id_prefix: impl Into<String>) -> Result<String, ClientError> {
        let action = ScheduleAction::Remove { id_prefix: id_prefix.into() };
        match self.send(&Request::Schedule { action }).await? {
            Response::ScheduleRemoved { id } => Ok(id),
            other => Self::reject(other),
        }
    }

    pub async fn chain(
        &mut self,
        user_id: impl Into<String>,
        steps: Vec<String>,
    ) -> Result<(Vec<ChainStepResult>, Option<usize>), ClientError> {
        let request = Request::Chain { user_id: user_id.into(), steps };
        match self.send(&request).await? {
            Response::ChainResult { steps, failed_at } => Ok((steps, failed_at)),
            other => Self::reject(other),
        }
    }

    pub async fn debug(
        &mut self,
        task_id_prefix: impl Into<String>,
    ) -> Result<Option<Box<taskd_wire::DebugSidecarView>>, ClientError> {
        let request = Request::Debug { task_id_prefix: task_id_prefix.into() };
        match self.send(&request).await? {
            Response::Debug { sidecar } => Ok(sidecar),
            other => Self::reject(other),
        }
    }
}

/// Find the `taskd` binary next to this one (or on `PATH`) and spawn it
/// detached, stdio pointed at the daemon's own rotated log file so `tj`'s
/// own terminal stays clean.
fn spawn_daemon() -> Result<(), ClientError> {
    let exe = std::env::current_exe().ok();
    let candidate = exe.as_ref().and_then(|p| p.parent()).map(|dir| dir.join("taskd"));
    let binary = candidate.filter(|p| p.exists()).unwrap_or_else(|| PathBuf::from("taskd"));

    std::process::Command::new(binary)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .map_err(|e| ClientError::Protocol(taskd_wire::ProtocolError::Io(e)))?;
    Ok(())
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
