// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tj submit` — hand a plain-language task to the daemon.

use std::path::PathBuf;

use anyhow::Result;

use crate::client::DaemonClient;
use crate::output::{format_or_json, OutputFormat};

pub async fn handle(format: OutputFormat, user_id: &str, message: String, files: Vec<PathBuf>) -> Result<()> {
    let mut client = DaemonClient::connect_or_start().await?;
    let task = client.submit(user_id, message, files).await?;
    format_or_json(format, &task, || {
        println!("submitted {} ({})", crate::color::header(task.id.short(12)), task.message_preview);
    })
}
