// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tj history` — the operator's most recent tasks.

use anyhow::Result;

use crate::client::DaemonClient;
use crate::output::{self, OutputFormat};

pub async fn handle(format: OutputFormat, user_id: &str, limit: usize) -> Result<()> {
    let mut client = DaemonClient::connect_or_start().await?;
    let entries = client.history(user_id, limit).await?;
    output::print_history(format, &entries)
}
