// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Everything a pipeline node needs beyond the `PipelineState` it's
//! mutating: the Gateway, the project registry, the sandbox container
//! backend, and the handful of tunables the daemon resolves from
//! environment variables.

use std::path::PathBuf;
use std::sync::Arc;

use taskd_gateway::{Gateway, RouteContext};
use taskd_runbook::ProjectRegistry;
use taskd_sandbox::{ContainerBackend, LiveOutputBuffer};

/// Shared, read-mostly dependencies for one pipeline run. Built once at
/// daemon startup (`registry`, `sandbox`, `gateway`) and cheaply cloned
/// per task; `route_ctx` is refreshed by the caller before each Gateway
/// call since it reflects the moment, not the daemon's static config.
#[derive(Clone)]
pub struct PipelineDeps {
    pub gateway: Arc<Gateway>,
    pub registry: Arc<ProjectRegistry>,
    pub sandbox: Option<Arc<ContainerBackend>>,
    pub route_ctx: RouteContext,
    /// Streamed-line sink for the task this clone of `deps` belongs to;
    /// set by the Coordinator per task, unlike the other fields here.
    pub live_output: Option<Arc<LiveOutputBuffer>>,
    pub max_retries: u32,
    pub coding_standards_path: Option<PathBuf>,
    pub coding_standards_cap_chars: usize,
    pub file_injection_cap_chars: usize,
    pub exec_timeout_s: u64,
    pub exec_hard_cap_s: u64,
}
