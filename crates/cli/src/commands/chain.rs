// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tj chain` — a strict-AND sequence of sub-prompts, each one substituting
//! `{output}` with the previous step's primary artifact path.

use anyhow::Result;

use crate::client::DaemonClient;
use crate::output::{self, OutputFormat};

pub async fn handle(format: OutputFormat, user_id: &str, steps: Vec<String>) -> Result<()> {
    let mut client = DaemonClient::connect_or_start().await?;
    let (steps, failed_at) = client.chain(user_id, steps).await?;
    output::print_chain_result(format, &steps, failed_at)
}
