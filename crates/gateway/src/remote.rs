// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remote model provider, speaking the Anthropic Messages API shape.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;
use crate::provider::{CompletionRequest, CompletionResponse, ModelProvider};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_API_VERSION: &str = "2023-06-01";

#[derive(Serialize)]
struct AnthropicMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ThinkingConfig {
    #[serde(rename = "type")]
    kind: &'static str,
    budget_tokens: u32,
}

#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking: Option<ThinkingConfig>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct Usage {
    input_tokens: u64,
    output_tokens: u64,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
    usage: Usage,
}

#[derive(Deserialize)]
struct AnthropicErrorEnvelope {
    error: AnthropicErrorBody,
}

#[derive(Deserialize)]
struct AnthropicErrorBody {
    #[serde(rename = "type")]
    error_type: String,
    message: String,
}

/// Calls the hosted Anthropic Messages API.
pub struct RemoteProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    api_version: String,
    model: String,
}

impl RemoteProvider {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            model: model.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl ModelProvider for RemoteProvider {
    async fn complete(&self, req: &CompletionRequest) -> Result<CompletionResponse, GatewayError> {
        let thinking_budget = if req.enable_thinking { req.max_tokens / 2 } else { 0 };
        let body = AnthropicRequest {
            model: self.model.clone(),
            max_tokens: req.max_tokens,
            messages: vec![AnthropicMessage { role: "user", content: req.prompt.clone() }],
            system: req.system.clone(),
            thinking: req
                .enable_thinking
                .then_some(ThinkingConfig { kind: "enabled", budget_tokens: thinking_budget.max(1024) }),
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Transient(e.to_string()))?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| GatewayError::Transient(e.to_string()))?;

        if !status.is_success() {
            if status.as_u16() == 429 || status.is_server_error() {
                return Err(GatewayError::Transient(format!("status {status}")));
            }
            if let Ok(envelope) = serde_json::from_slice::<AnthropicErrorEnvelope>(&bytes) {
                return Err(GatewayError::Provider(format!(
                    "{}: {}",
                    envelope.error.error_type, envelope.error.message
                )));
            }
            return Err(GatewayError::Provider(format!("status {status}")));
        }

        let parsed: AnthropicResponse =
            serde_json::from_slice(&bytes).map_err(|e| GatewayError::Provider(e.to_string()))?;

        let content: String =
            parsed.content.iter().filter(|block| block.kind == "text").map(|block| block.text.as_str()).collect();

        Ok(CompletionResponse {
            content,
            input_tokens: parsed.usage.input_tokens,
            output_tokens: parsed.usage.output_tokens,
            thinking_tokens: 0,
        })
    }
}

#[cfg(test)]
#[path = "remote_tests.rs"]
mod tests;
