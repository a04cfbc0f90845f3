// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tj debug <id>` — the debug sidecar recorded for a task, matched by id prefix.

use anyhow::Result;

use crate::client::DaemonClient;
use crate::output::{self, OutputFormat};

pub async fn handle(format: OutputFormat, task_id_prefix: &str) -> Result<()> {
    let mut client = DaemonClient::connect_or_start().await?;
    let sidecar = client.debug(task_id_prefix).await?;
    output::print_debug_sidecar(format, sidecar)
}
