// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tj schedule` — create, list, or remove a recurring job.

use anyhow::Result;
use clap::Subcommand;

use crate::client::DaemonClient;
use crate::output::{self, OutputFormat};

#[derive(Subcommand)]
pub enum ScheduleCommand {
    /// Create a recurring job that resubmits `target` every `interval` seconds.
    Create {
        #[arg(long)]
        interval: u64,
        target: String,
    },
    /// List recurring jobs.
    List,
    /// Remove a recurring job by id prefix.
    Remove { id_prefix: String },
}

pub async fn handle(command: ScheduleCommand, format: OutputFormat) -> Result<()> {
    let mut client = DaemonClient::connect_or_start().await?;
    match command {
        ScheduleCommand::Create { interval, target } => {
            let entry = client.schedule_create(interval, target).await?;
            output::print_schedule_entry(format, &entry)
        }
        ScheduleCommand::List => {
            let entries = client.schedule_list().await?;
            output::print_schedule_entries(format, &entries)
        }
        ScheduleCommand::Remove { id_prefix } => {
            let id = client.schedule_remove(id_prefix).await?;
            output::print_schedule_removed(format, &id)
        }
    }
}
