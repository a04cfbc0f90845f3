// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup: acquire the lock file, create the state directory
//! layout, replay the WAL into a fresh `TaskdState`, and wire up rotated
//! file logging. Mirrors the teacher's lock-file-then-replay-then-bind
//! ordering, without the teacher's breadcrumb/orphan-job reconciliation
//! machinery (no counterpart here — tasks found `Running`/`Pending` on
//! boot are rewritten to `Crashed` instead, see `reconcile_stale_tasks`).

use std::fs::File;
use std::path::Path;

use fs2::FileExt;
use taskd_core::{Task, TaskStatus};
use taskd_storage::{Checkpointer, Event, TaskdState};
use tracing_appender::non_blocking::WorkerGuard;

use crate::config::Config;

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("failed to create state directory {path}: {source}")]
    CreateDir { path: std::path::PathBuf, source: std::io::Error },
    #[error("failed to open lock file {path}: {source}")]
    OpenLock { path: std::path::PathBuf, source: std::io::Error },
    #[error("another taskd instance holds the lock at {0}")]
    AlreadyRunning(std::path::PathBuf),
    #[error(transparent)]
    Checkpoint(#[from] taskd_storage::CheckpointError),
}

/// Holds the lock file open for the process lifetime; dropping it
/// releases the exclusive lock.
pub struct LockGuard {
    _file: File,
}

fn ensure_dir(path: &Path) -> Result<(), LifecycleError> {
    std::fs::create_dir_all(path).map_err(|source| LifecycleError::CreateDir { path: path.to_path_buf(), source })
}

/// Create every directory the daemon writes to under the state dir.
pub fn prepare_directories(config: &Config) -> Result<(), LifecycleError> {
    ensure_dir(&config.state_dir)?;
    ensure_dir(&config.log_dir())?;
    ensure_dir(&config.uploads_dir())?;
    ensure_dir(&config.outputs_dir())?;
    ensure_dir(&config.state_dir.join("tasks"))?;
    Ok(())
}

/// Acquire the exclusive process lock, failing fast if another daemon
/// already holds it rather than corrupting the WAL with two writers.
pub fn acquire_lock(config: &Config) -> Result<LockGuard, LifecycleError> {
    let path = config.lock_path();
    let file = File::create(&path).map_err(|source| LifecycleError::OpenLock { path: path.clone(), source })?;
    file.try_lock_exclusive().map_err(|_| LifecycleError::AlreadyRunning(path))?;
    Ok(LockGuard { _file: file })
}

/// Initialize rotated file logging under `<state_dir>/logs`, returning
/// the worker guard the caller must hold for the process lifetime (the
/// background writer thread stops flushing once it is dropped).
pub fn init_logging(config: &Config) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily(config.log_dir(), "taskd.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(filter).with_writer(non_blocking).with_ansi(false).init();

    guard
}

/// Open the checkpointer, replay the WAL into a fresh `TaskdState`, then
/// rewrite any task still `Running`/`Pending` to `Crashed` — the prior
/// process died mid-task, so it can never reach a terminal state on its
/// own.
pub fn recover(config: &Config) -> Result<(Checkpointer, TaskdState), LifecycleError> {
    let (mut checkpointer, mut state) = Checkpointer::open(config.wal_path(), config.snapshot_path())?;
    reconcile_stale_tasks(&mut checkpointer, &mut state)?;
    Ok((checkpointer, state))
}

fn reconcile_stale_tasks(checkpointer: &mut Checkpointer, state: &mut TaskdState) -> Result<(), LifecycleError> {
    let stale: Vec<Task> = state
        .tasks
        .values()
        .filter(|t| matches!(t.status, TaskStatus::Pending | TaskStatus::Running))
        .cloned()
        .collect();

    for task in stale {
        tracing::warn!(task_id = %task.id, "rewriting stale task to crashed on startup");
        checkpointer.append(state, Event::TaskStatusChanged { task_id: task.id, status: TaskStatus::Crashed })?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
