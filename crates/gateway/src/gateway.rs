// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Model Gateway: one `call` entry point that picks a provider,
//! enforces spend caps, and retries transient failures.

use std::cell::Cell;
use std::sync::Arc;
use std::time::Duration;

use taskd_core::ApiUsageRecord;
use taskd_core::TaskId;

use crate::budget::{self, GatewayConfig};
use crate::error::GatewayError;
use crate::provider::{CompletionRequest, ModelProvider};
use crate::purpose::{Complexity, Purpose};
use crate::route::{self, Route, RouteContext};

const RETRY_BASE_MS: u64 = 500;
const RETRY_FACTOR: u32 = 2;
const MAX_ATTEMPTS: u32 = 3;

thread_local! {
    /// Set by the worker spawn path on every thread that is allowed to
    /// make blocking-shaped Gateway calls. Never set on the tokio
    /// reactor threads themselves.
    static OFF_LOOP: Cell<bool> = const { Cell::new(false) };
}

/// Marks the current thread as off the tokio reactor, permitting
/// `Gateway::call`. Call once from each worker thread's entry point.
pub fn mark_off_loop() {
    OFF_LOOP.with(|flag| flag.set(true));
}

fn on_reactor_thread() -> bool {
    tokio::runtime::Handle::try_current().is_ok() && !OFF_LOOP.with(Cell::get)
}

/// One successful completion plus the usage record the caller should
/// persist to the spend ledger.
#[derive(Debug, Clone)]
pub struct GatewayCall {
    pub content: String,
    pub record: ApiUsageRecord,
}

/// Ties routing, providers, and the spend ledger together behind one
/// entry point.
pub struct Gateway {
    remote: Arc<dyn ModelProvider>,
    local: Arc<dyn ModelProvider>,
    config: GatewayConfig,
}

impl Gateway {
    pub fn new(remote: Arc<dyn ModelProvider>, local: Arc<dyn ModelProvider>, config: GatewayConfig) -> Self {
        Self { remote, local, config }
    }

    /// Runs one completion, routed by `purpose`/`complexity`, retried on
    /// transient or empty-response failures with exponential backoff.
    ///
    /// `records` is the caller's current spend ledger, used to compute
    /// today's/this month's spend before every call; `now_ms` and
    /// `task_id` stamp the returned usage record.
    #[allow(clippy::too_many_arguments)]
    pub async fn call(
        &self,
        task_id: TaskId,
        purpose: Purpose,
        complexity: Complexity,
        prompt: String,
        system: Option<String>,
        max_tokens: u32,
        enable_thinking: bool,
        ctx: RouteContext,
        records: &[ApiUsageRecord],
        now_ms: u64,
    ) -> Result<GatewayCall, GatewayError> {
        if on_reactor_thread() {
            tracing::error!("Gateway::call invoked from the tokio reactor thread");
        }

        let status = budget::summarize(records, &self.config.pricing, now_ms);
        budget::enforce(&status, &self.config)?;

        let route = route::route(purpose, complexity, &ctx);
        let req = CompletionRequest { prompt, system, max_tokens, enable_thinking };

        let (model_name, response) = match route {
            Route::Remote => ("remote", Self::call_with_retries(&self.remote, &req).await?),
            Route::Local => match Self::call_with_retries(&self.local, &req).await {
                Ok(response) => ("local", response),
                Err(e) => {
                    tracing::warn!(error = %e, "local path exhausted, falling back to remote");
                    ("remote", Self::call_with_retries(&self.remote, &req).await?)
                }
            },
        };

        let record = ApiUsageRecord {
            task_id,
            purpose: purpose.as_str().to_string(),
            model: model_name.to_string(),
            input_tokens: response.input_tokens,
            output_tokens: response.output_tokens,
            thinking_tokens: response.thinking_tokens,
            recorded_at_ms: now_ms,
        };
        Ok(GatewayCall { content: response.content, record })
    }

    /// Retries one provider up to `MAX_ATTEMPTS` times with exponential
    /// backoff on transient or empty-response failures. Does not switch
    /// providers — that's the caller's job (see the local-to-remote
    /// fallback in `call`).
    async fn call_with_retries(
        provider: &Arc<dyn ModelProvider>,
        req: &CompletionRequest,
    ) -> Result<crate::provider::CompletionResponse, GatewayError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let outcome = provider.complete(req).await;
            let result = match outcome {
                Ok(response) if response.is_empty() => Err(GatewayError::Empty),
                other => other,
            };

            match result {
                Ok(response) => return Ok(response),
                Err(e) if e.is_transient() && attempt < MAX_ATTEMPTS => {
                    let backoff_ms = RETRY_BASE_MS * RETRY_FACTOR.pow(attempt - 1) as u64;
                    tracing::warn!(attempt, backoff_ms, error = %e, "gateway call failed, retrying");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
#[path = "gateway_tests.rs"]
mod tests;
