// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tj context` — view or clear the operator's conversation history.

use anyhow::Result;

use crate::client::DaemonClient;
use crate::output::{self, OutputFormat};

pub async fn handle(format: OutputFormat, user_id: &str, clear: bool) -> Result<()> {
    let mut client = DaemonClient::connect_or_start().await?;
    let turns = client.context(user_id, clear).await?;
    if clear {
        return output::format_or_json(format, &turns, || println!("conversation history cleared"));
    }
    output::print_context(format, &turns)
}
