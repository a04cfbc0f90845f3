// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The provider seam both remote and local models implement.

use async_trait::async_trait;

use crate::error::GatewayError;

/// One completion request, provider-agnostic.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub prompt: String,
    pub system: Option<String>,
    pub max_tokens: u32,
    pub enable_thinking: bool,
}

/// One completion response, provider-agnostic.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub thinking_tokens: u64,
}

impl CompletionResponse {
    /// True when the response carries no usable text — a thinking-only
    /// reply or a content-free one — distinct from a transport failure.
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// A backend capable of serving one completion call. `RemoteProvider`
/// and `LocalProvider` both implement this, mirroring the shape of the
/// teacher's agent adapter trait.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn complete(&self, req: &CompletionRequest) -> Result<CompletionResponse, GatewayError>;
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
