// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tj exec` — run a single command through the sandbox directly,
//! bypassing the classify/plan stages.

use anyhow::Result;

use crate::client::DaemonClient;
use crate::output::{self, OutputFormat};

pub async fn handle(format: OutputFormat, user_id: &str, command: String) -> Result<()> {
    let mut client = DaemonClient::connect_or_start().await?;
    let (exit_code, stdout, stderr) = client.exec(user_id, command).await?;
    output::print_exec_result(format, exit_code, &stdout, &stderr)
}
