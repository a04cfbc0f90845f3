// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tj cost` — spend for today and the current month, by model.

use anyhow::Result;

use crate::client::DaemonClient;
use crate::output::{self, OutputFormat};

pub async fn handle(format: OutputFormat) -> Result<()> {
    let mut client = DaemonClient::connect_or_start().await?;
    let report = client.cost().await?;
    output::print_cost(format, &report)
}
