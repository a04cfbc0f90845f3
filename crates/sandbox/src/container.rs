// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Docker-backed execution, grounded on the teacher's Docker adapter:
//! same `docker run` flag shape, same availability-poll pattern.

use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use taskd_core::ExecutionResult;
use tokio::process::Command;

use crate::subprocess::LiveOutputBuffer;
use crate::SandboxError;

const DOCKER_SOCKET: &str = "/var/run/docker.sock";
const AVAILABILITY_CACHE_MS: u64 = 60_000;

fn epoch_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
}

/// Resource limits applied to every container run.
#[derive(Debug, Clone)]
pub struct ResourceLimits {
    pub memory_mb: u64,
    pub cpus: f64,
    pub pids_limit: u32,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self { memory_mb: 1024, cpus: 1.0, pids_limit: 256 }
    }
}

/// Caches Docker availability for [`AVAILABILITY_CACHE_MS`] so a probe
/// isn't repeated on every call to the sandbox.
pub struct ContainerBackend {
    image: String,
    limits: ResourceLimits,
    network: Option<String>,
    last_checked_ms: AtomicU64,
    last_available: AtomicBool,
}

impl ContainerBackend {
    pub fn new(image: impl Into<String>, limits: ResourceLimits, network: Option<String>) -> Self {
        Self {
            image: image.into(),
            limits,
            network,
            last_checked_ms: AtomicU64::new(0),
            last_available: AtomicBool::new(false),
        }
    }

    /// Whether Docker is reachable, reusing the cached result when it is
    /// younger than [`AVAILABILITY_CACHE_MS`].
    pub async fn is_available(&self) -> bool {
        let now = epoch_ms();
        let checked_at = self.last_checked_ms.load(Ordering::Relaxed);
        if now.saturating_sub(checked_at) < AVAILABILITY_CACHE_MS {
            return self.last_available.load(Ordering::Relaxed);
        }

        let available = self.probe().await;
        self.last_checked_ms.store(now, Ordering::Relaxed);
        self.last_available.store(available, Ordering::Relaxed);
        available
    }

    /// Quick socket connect first (cheap, fails fast when the daemon is
    /// down), then `docker version` to confirm the CLI actually works.
    async fn probe(&self) -> bool {
        if UnixStream::connect(DOCKER_SOCKET).is_err() {
            return false;
        }
        Command::new("docker").arg("version").arg("--format").arg("{{.Server.Version}}").output().await.is_ok_and(
            |output| output.status.success(),
        )
    }

    /// Validate that `working_dir` resolves under the caller's `$HOME`
    /// before it is ever passed to `-v`. A container mount outside the
    /// operator's home is refused rather than silently redirected.
    fn validate_working_dir(working_dir: &Path) -> Result<PathBuf, SandboxError> {
        let home = dirs::home_dir().ok_or_else(|| SandboxError::Refused("no $HOME for container mount".into()))?;
        let canonical = working_dir
            .canonicalize()
            .map_err(|e| SandboxError::Refused(format!("working dir does not exist: {e}")))?;
        if !canonical.starts_with(&home) {
            return Err(SandboxError::Refused(format!(
                "working dir {} is outside $HOME, refusing container mount",
                canonical.display()
            )));
        }
        Ok(canonical)
    }

    /// Run `program args...` inside a disposable container, with
    /// `working_dir` mounted read-write at `/workspace`, an `uploads`
    /// volume read-only, and an `outputs` volume read-write.
    pub async fn run(
        &self,
        program: &str,
        args: &[String],
        working_dir: &Path,
        timeout: Duration,
        live: Option<Arc<LiveOutputBuffer>>,
    ) -> Result<ExecutionResult, SandboxError> {
        let working_dir = Self::validate_working_dir(working_dir)?;

        let mut docker_args: Vec<String> = vec![
            "run".into(),
            "--rm".into(),
            "-v".into(),
            format!("{}:/workspace:rw", working_dir.display()),
            "-v".into(),
            "outputs:/workspace/outputs:rw".into(),
            "-v".into(),
            "uploads:/workspace/uploads:ro".into(),
            "-w".into(),
            "/workspace".into(),
            "--memory".into(),
            format!("{}m", self.limits.memory_mb),
            "--cpus".into(),
            self.limits.cpus.to_string(),
            "--pids-limit".into(),
            self.limits.pids_limit.to_string(),
            "--cap-drop=ALL".into(),
            "--security-opt".into(),
            "no-new-privileges".into(),
        ];
        if let Some(network) = &self.network {
            docker_args.push("--network".into());
            docker_args.push(network.clone());
        } else {
            docker_args.push("--network".into());
            docker_args.push("none".into());
        }
        docker_args.push(self.image.clone());
        docker_args.push(program.to_string());
        docker_args.extend(args.iter().cloned());

        crate::subprocess::run(
            "docker",
            &docker_args,
            &working_dir,
            &std::collections::HashMap::new(),
            timeout,
            live,
        )
        .await
    }
}

#[cfg(test)]
#[path = "container_tests.rs"]
mod tests;
