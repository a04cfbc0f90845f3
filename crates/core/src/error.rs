// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace-shared error kinds.
//!
//! Every crate in the `taskd` family reports failures through its own
//! `thiserror` enum, but all of those enums ultimately convert into
//! [`TaskdError`] at the boundary where a failure becomes user-visible
//! (the Coordinator, the Deliverer). Keeping one canonical set of kinds
//! here means the sanitiser and the audit short-circuit can match on
//! `TaskdError` variants instead of re-deriving "is this transient"
//! per crate.

use crate::sanitize::sanitize_message;

/// Top-level failure kinds for the execution core.
#[derive(Debug, thiserror::Error)]
pub enum TaskdError {
    /// Refused by the tier-1 blocklist or the tier-4 code-content scanner.
    #[error("refused: {0}")]
    RefusedBySafety(String),

    /// Non-zero exit from a generated script or shell command.
    #[error("execution failed (exit {exit_code:?}): {traceback}")]
    ExecutionFailure { exit_code: Option<i32>, traceback: String },

    /// Per-execution or per-pipeline timeout.
    #[error("timed out after {0:?}")]
    TimedOut(std::time::Duration),

    /// Auto-install retries exhausted without a successful run.
    #[error("auto-install exhausted: {0}")]
    AutoInstallExhausted(String),

    /// Rate-limit, request-timeout, or other transient model-API error. Retried.
    #[error("transient model error: {0}")]
    ModelTransient(String),

    /// Response contained only thinking blocks or an empty content list. Retried.
    #[error("empty model response")]
    ModelEmpty,

    /// Spend ledger over the configured daily or monthly cap.
    #[error("budget exceeded: {0}")]
    BudgetExceeded(String),

    /// Malformed caller input (e.g. an unparsable chain).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Infrastructure failure recognised by signature (timeout, disk full,
    /// bad fd, DNS) rather than by code-level diagnosis.
    #[error("environment error: {0}")]
    EnvironmentError(String),

    /// Rejected by a resource guard (RAM, concurrency, cooldown).
    #[error("rejected: {0}")]
    GuardRejected(String),
}

impl TaskdError {
    /// Whether the Gateway should retry this error with backoff.
    pub fn is_transient(&self) -> bool {
        matches!(self, TaskdError::ModelTransient(_) | TaskdError::ModelEmpty)
    }

    /// The user-visible, sanitised form of this error.
    ///
    /// Strips the operator's home prefix and credential-shaped fragments;
    /// full detail belongs in the server log via `tracing::error!(%err)`,
    /// never in this string.
    pub fn sanitized(&self) -> String {
        sanitize_message(&self.to_string())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
