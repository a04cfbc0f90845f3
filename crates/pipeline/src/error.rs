// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Failure kinds a pipeline node can return.

use taskd_gateway::GatewayError;
use taskd_sandbox::SandboxError;

#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    #[error("refused by safety scan: {0}")]
    RefusedBySafety(String),
    #[error(transparent)]
    Sandbox(#[from] SandboxError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("failed to read coding standards file: {0}")]
    Standards(#[from] std::io::Error),
    #[error("invalid classifier/planner response: {0}")]
    InvalidResponse(String),
}

impl NodeError {
    pub fn is_environment_error(&self) -> bool {
        matches!(self, NodeError::Sandbox(SandboxError::ContainerUnavailable))
    }
}
