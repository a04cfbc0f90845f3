// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tj task <id>` — full detail for one task, matched by id prefix.

use anyhow::Result;

use crate::client::DaemonClient;
use crate::output::{self, OutputFormat};

pub async fn handle(format: OutputFormat, user_id: &str, task_id_prefix: &str) -> Result<()> {
    let mut client = DaemonClient::connect_or_start().await?;
    let task = client.task_detail(user_id, task_id_prefix).await?;
    output::print_task_detail(format, task)
}
