// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Executes model-generated code: safety scanning, subprocess or
//! container isolation, environment stripping, artifact collection,
//! and the missing-package auto-install retry loop.

pub mod artifacts;
pub mod autoinstall;
pub mod container;
pub mod env_strip;
pub mod safety;
pub mod subprocess;

pub use autoinstall::RetryBudget;
pub use container::{ContainerBackend, ResourceLimits};
pub use subprocess::{LiveOutputBuffer, LIVE_OUTPUT_CAP};

/// Errors raised while isolating and running a task's code.
#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    #[error("refused by safety scan: {0}")]
    Refused(String),
    #[error("failed to spawn sandboxed process: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("spawned process exposed no pid or no stdio pipe")]
    NoPid,
    #[error("auto-install retry budget exhausted")]
    AutoInstallExhausted,
    #[error("container backend unavailable")]
    ContainerUnavailable,
}

impl SandboxError {
    pub fn is_refusal(&self) -> bool {
        matches!(self, SandboxError::Refused(_))
    }
}

/// Scan `text` against the tier-1 blocklist and tier-4 code-content
/// scanner, returning the first refusal reason found. Tier-4 is skipped
/// when `container_active` is true, since the generated code never runs
/// directly on the host in that mode.
pub fn refuse_if_unsafe(text: &str, container_active: bool) -> Result<(), SandboxError> {
    if let Some(violation) = safety::tier1::scan(text).into_iter().next() {
        return Err(SandboxError::Refused(format!("{}: {}", violation.label, violation.line)));
    }
    if !container_active {
        if let Some(violation) = safety::tier4::scan(text).into_iter().next() {
            return Err(SandboxError::Refused(format!("{}: {}", violation.label, violation.line)));
        }
    }
    for audited in safety::tier3::scan(text) {
        tracing::warn!(label = audited.label, line = %audited.line, "tier3 command audited");
    }
    Ok(())
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
