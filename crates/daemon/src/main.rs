// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon entry point: resolve configuration, acquire the process lock,
//! replay the WAL, wire up the Gateway and pipeline graph, then serve
//! the Unix socket until told to shut down.

use std::sync::Arc;

use taskd_daemon::config::Config;
use taskd_daemon::coordinator::Coordinator;
use taskd_daemon::lifecycle;
use taskd_daemon::listener;
use taskd_gateway::{Gateway, GatewayConfig, LocalProvider, RemoteProvider};
use taskd_pipeline::{Graph, PipelineDeps};
use taskd_runbook::ProjectRegistry;
use taskd_sandbox::{ContainerBackend, ResourceLimits};

#[derive(Debug, thiserror::Error)]
enum DaemonError {
    #[error(transparent)]
    Config(#[from] taskd_daemon::config::ConfigError),
    #[error(transparent)]
    Lifecycle(#[from] taskd_daemon::lifecycle::LifecycleError),
    #[error(transparent)]
    Listener(#[from] taskd_daemon::listener::ListenerError),
}

#[tokio::main]
async fn main() -> Result<(), DaemonError> {
    let config = Arc::new(Config::from_env()?);

    lifecycle::prepare_directories(&config)?;
    let _lock = lifecycle::acquire_lock(&config)?;
    let _log_guard = lifecycle::init_logging(&config);

    tracing::info!(state_dir = %config.state_dir.display(), "taskd starting");

    let (checkpointer, state) = lifecycle::recover(&config)?;

    let remote = Arc::new(RemoteProvider::new(
        config.remote_api_key.clone().unwrap_or_default(),
        config.model_high_capability.clone(),
    ));
    let local = Arc::new(LocalProvider::new(config.local_endpoint.clone()));
    let gateway = Arc::new(Gateway::new(
        remote,
        local.clone(),
        GatewayConfig {
            daily_cap_usd: config.daily_cap_usd(),
            monthly_cap_usd: config.monthly_cap_usd(),
            pricing: config.pricing.clone(),
        },
    ));

    let registry = match &config.project_registry_path {
        Some(path) if path.exists() => match ProjectRegistry::load(path) {
            Ok(registry) => registry,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to load project registry, starting empty");
                ProjectRegistry::empty()
            }
        },
        _ => ProjectRegistry::empty(),
    };

    let sandbox = if config.container_enabled {
        let limits = ResourceLimits {
            memory_mb: config.container_memory_mb,
            cpus: config.container_cpus,
            pids_limit: 256,
        };
        Some(Arc::new(ContainerBackend::new("taskd-sandbox:latest", limits, config.container_network.clone())))
    } else {
        None
    };

    let deps = PipelineDeps {
        gateway,
        registry: Arc::new(registry),
        sandbox,
        route_ctx: taskd_gateway::RouteContext { local_healthy: false, ram_low: false, spend_ratio: 0.0 },
        live_output: None,
        max_retries: config.max_retries,
        coding_standards_path: config.coding_standards_path.clone(),
        coding_standards_cap_chars: config.coding_standards_cap_chars,
        file_injection_cap_chars: config.file_injection_cap_chars,
        exec_timeout_s: config.exec_timeout_s,
        exec_hard_cap_s: config.exec_hard_cap_s,
    };

    let graph = Arc::new(Graph::new());
    let coordinator = Coordinator::new(config.clone(), checkpointer, state, graph, deps, local);

    listener::serve(&config.ipc_socket_path(), coordinator).await?;
    Ok(())
}
