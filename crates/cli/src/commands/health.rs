// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tj health` — RAM, disk, local-model, and project status.

use anyhow::Result;

use crate::client::DaemonClient;
use crate::output::{self, OutputFormat};

pub async fn handle(format: OutputFormat) -> Result<()> {
    let mut client = DaemonClient::connect_or_start().await?;
    let report = client.health().await?;
    output::print_health(format, &report)
}
