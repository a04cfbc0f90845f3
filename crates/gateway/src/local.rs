// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Local model provider, talking to an in-process or sidecar HTTP
//! endpoint that serves a small model with no API key.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;
use crate::provider::{CompletionRequest, CompletionResponse, ModelProvider};

#[derive(Serialize)]
struct LocalRequest<'a> {
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct LocalResponse {
    text: String,
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

/// Calls a locally-hosted model over HTTP. Thinking is never requested;
/// the local model has no thinking mode.
pub struct LocalProvider {
    client: reqwest::Client,
    base_url: String,
}

impl LocalProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), base_url: base_url.into() }
    }

    pub async fn is_healthy(&self) -> bool {
        self.client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }
}

#[async_trait]
impl ModelProvider for LocalProvider {
    async fn complete(&self, req: &CompletionRequest) -> Result<CompletionResponse, GatewayError> {
        let body =
            LocalRequest { prompt: &req.prompt, system: req.system.as_deref(), max_tokens: req.max_tokens };

        let response = self
            .client
            .post(format!("{}/v1/complete", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Transient(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            if status.is_server_error() {
                return Err(GatewayError::Transient(format!("status {status}")));
            }
            return Err(GatewayError::Provider(format!("status {status}")));
        }

        let parsed: LocalResponse =
            response.json().await.map_err(|e| GatewayError::Provider(e.to_string()))?;

        Ok(CompletionResponse {
            content: parsed.text,
            input_tokens: parsed.input_tokens,
            output_tokens: parsed.output_tokens,
            thinking_tokens: 0,
        })
    }
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
