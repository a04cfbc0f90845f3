// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate. One
//! function per variable, `TASKD_`-prefixed, with a fallback chain and a
//! typed return value.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use taskd_gateway::ModelPricing;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot resolve a state directory: no TASKD_STATE_DIR, XDG_STATE_HOME, or HOME set")]
    NoStateDir,
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name).ok().and_then(|s| s.parse().ok()).unwrap_or(default)
}

fn env_u32(name: &str, default: u32) -> u32 {
    std::env::var(name).ok().and_then(|s| s.parse().ok()).unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    std::env::var(name).ok().and_then(|s| s.parse().ok()).unwrap_or(default)
}

fn env_f64(name: &str, default: f64) -> f64 {
    std::env::var(name).ok().and_then(|s| s.parse().ok()).unwrap_or(default)
}

fn env_bool(name: &str, default: bool) -> bool {
    std::env::var(name).ok().and_then(|s| s.parse().ok()).unwrap_or(default)
}

/// Resolve the state directory: `TASKD_STATE_DIR` > `XDG_STATE_HOME/taskd`
/// > `~/.local/state/taskd`.
pub fn state_dir() -> Result<PathBuf, ConfigError> {
    if let Ok(dir) = std::env::var("TASKD_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("taskd"));
    }
    let home = dirs::home_dir().ok_or(ConfigError::NoStateDir)?;
    Ok(home.join(".local/state/taskd"))
}

/// Operators allowed to talk to the daemon, comma-separated in
/// `TASKD_OPERATOR_IDS`. Empty means "allow-list not enforced".
pub fn operator_ids() -> Vec<String> {
    std::env::var("TASKD_OPERATOR_IDS")
        .ok()
        .map(|raw| raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect())
        .unwrap_or_default()
}

/// Full runtime configuration, resolved once at startup and held behind
/// an `Arc` for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct Config {
    pub state_dir: PathBuf,
    pub operator_ids: Vec<String>,

    pub model_default: String,
    pub model_high_capability: String,
    pub remote_api_key: Option<String>,
    pub local_endpoint: String,

    pub exec_timeout_s: u64,
    pub exec_hard_cap_s: u64,
    pub pipeline_timeout_s: u64,
    pub max_retries: u32,
    pub api_max_retries: u32,

    pub upload_max_bytes: u64,
    pub daily_spend_cap_cents: u64,
    pub monthly_spend_cap_cents: u64,

    pub container_enabled: bool,
    pub container_memory_mb: u64,
    pub container_cpus: f64,
    pub container_network: Option<String>,

    pub max_concurrency: usize,
    pub ram_threshold_pct: f64,
    pub submit_cooldown_s: u64,
    pub file_injection_cap_chars: usize,
    pub coding_standards_path: Option<PathBuf>,
    pub coding_standards_cap_chars: usize,
    pub project_registry_path: Option<PathBuf>,

    pub pricing: HashMap<String, ModelPricing>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let state_dir = state_dir()?;
        Ok(Self {
            operator_ids: operator_ids(),

            model_default: std::env::var("TASKD_MODEL_DEFAULT")
                .unwrap_or_else(|_| "claude-haiku-4-5".to_string()),
            model_high_capability: std::env::var("TASKD_MODEL_HIGH_CAPABILITY")
                .unwrap_or_else(|_| "claude-opus-4-6".to_string()),
            remote_api_key: std::env::var("TASKD_ANTHROPIC_API_KEY").ok(),
            local_endpoint: std::env::var("TASKD_LOCAL_ENDPOINT")
                .unwrap_or_else(|_| "http://127.0.0.1:8131".to_string()),

            exec_timeout_s: env_u64("TASKD_EXEC_TIMEOUT_S", 60),
            exec_hard_cap_s: env_u64("TASKD_EXEC_HARD_CAP_S", 300),
            pipeline_timeout_s: env_u64("TASKD_PIPELINE_TIMEOUT_S", 900),
            max_retries: env_u32("TASKD_MAX_RETRIES", 2),
            api_max_retries: env_u32("TASKD_API_MAX_RETRIES", 3),

            upload_max_bytes: env_u64("TASKD_UPLOAD_MAX_BYTES", 25 * 1024 * 1024),
            daily_spend_cap_cents: env_u64("TASKD_DAILY_SPEND_CAP_CENTS", 2_000),
            monthly_spend_cap_cents: env_u64("TASKD_MONTHLY_SPEND_CAP_CENTS", 30_000),

            container_enabled: env_bool("TASKD_CONTAINER_ENABLED", false),
            container_memory_mb: env_u64("TASKD_CONTAINER_MEMORY_MB", 1024),
            container_cpus: env_f64("TASKD_CONTAINER_CPUS", 1.0),
            container_network: std::env::var("TASKD_CONTAINER_NETWORK").ok(),

            max_concurrency: env_usize("TASKD_MAX_CONCURRENCY", 4),
            ram_threshold_pct: env_f64("TASKD_RAM_THRESHOLD_PCT", 80.0),
            submit_cooldown_s: env_u64("TASKD_SUBMIT_COOLDOWN_S", 5),
            file_injection_cap_chars: env_usize("TASKD_FILE_INJECTION_CAP_CHARS", 2_000),
            coding_standards_path: std::env::var("TASKD_CODING_STANDARDS_PATH").ok().map(PathBuf::from),
            coding_standards_cap_chars: env_usize("TASKD_CODING_STANDARDS_CAP_CHARS", 4_000),
            project_registry_path: std::env::var("TASKD_PROJECT_REGISTRY_PATH")
                .ok()
                .map(PathBuf::from)
                .or_else(|| Some(state_dir.join("projects.hcl"))),

            pricing: default_pricing(),
            state_dir,
        })
    }

    pub fn daily_cap_usd(&self) -> f64 {
        self.daily_spend_cap_cents as f64 / 100.0
    }

    pub fn monthly_cap_usd(&self) -> f64 {
        self.monthly_spend_cap_cents as f64 / 100.0
    }

    pub fn ipc_socket_path(&self) -> PathBuf {
        self.state_dir.join("taskd.sock")
    }

    pub fn lock_path(&self) -> PathBuf {
        self.state_dir.join("taskd.lock")
    }

    pub fn wal_path(&self) -> PathBuf {
        self.state_dir.join("taskd.wal")
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.state_dir.join("taskd.snapshot.zst")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.state_dir.join("logs")
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.state_dir.join("uploads")
    }

    pub fn outputs_dir(&self) -> PathBuf {
        self.state_dir.join("outputs")
    }

    pub fn task_workdir(&self, task_id: &str) -> PathBuf {
        self.state_dir.join("tasks").join(task_id)
    }
}

/// Per-million-token pricing for the two models the Gateway routes
/// between. Flat defaults; an operator who needs different numbers sets
/// `TASKD_MODEL_DEFAULT`/`TASKD_MODEL_HIGH_CAPABILITY` to models already
/// in this table or edits it here.
fn default_pricing() -> HashMap<String, ModelPricing> {
    let mut pricing = HashMap::new();
    pricing.insert(
        "remote".to_string(),
        ModelPricing { input_per_million_usd: 3.0, output_per_million_usd: 15.0 },
    );
    pricing.insert(
        "local".to_string(),
        ModelPricing { input_per_million_usd: 0.0, output_per_million_usd: 0.0 },
    );
    pricing
}

pub fn ipc_timeout() -> Duration {
    Duration::from_millis(env_u64("TASKD_IPC_TIMEOUT_MS", 5_000))
}

pub fn drain_timeout() -> Duration {
    Duration::from_millis(env_u64("TASKD_DRAIN_TIMEOUT_MS", 5_000))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
