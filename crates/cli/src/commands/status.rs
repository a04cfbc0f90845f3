// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tj status` — tasks currently in the pipeline for the operator.

use anyhow::Result;

use crate::client::DaemonClient;
use crate::output::{self, OutputFormat};

pub async fn handle(format: OutputFormat, user_id: &str) -> Result<()> {
    let mut client = DaemonClient::connect_or_start().await?;
    let tasks = client.status(user_id).await?;
    output::print_task_summaries(format, &tasks)
}
