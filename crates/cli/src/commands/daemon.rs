// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tj daemon` — start, stop, and check on the background `taskd` process.

use anyhow::{anyhow, Result};
use clap::Subcommand;

use crate::client::DaemonClient;
use crate::output::{format_or_json, OutputFormat};

#[derive(Subcommand)]
pub enum DaemonCommand {
    /// Start the daemon if it isn't already running.
    Start,
    /// Ask the daemon to shut down cleanly.
    Stop,
    /// Print the daemon's version, or report that it isn't running.
    Status,
}

pub async fn handle(command: DaemonCommand, format: OutputFormat) -> Result<()> {
    match command {
        DaemonCommand::Start => start().await,
        DaemonCommand::Stop => stop().await,
        DaemonCommand::Status => status(format).await,
    }
}

async fn start() -> Result<()> {
    if DaemonClient::connect().await.is_ok() {
        println!("Daemon already running");
        return Ok(());
    }
    DaemonClient::connect_or_start().await.map_err(|e| anyhow!("{e}"))?;
    println!("Daemon started");
    Ok(())
}

async fn stop() -> Result<()> {
    let mut client = match DaemonClient::connect().await {
        Ok(c) => c,
        Err(_) => {
            println!("Daemon is not running");
            return Ok(());
        }
    };
    client.shutdown().await?;
    println!("Daemon shutting down");
    Ok(())
}

async fn status(format: OutputFormat) -> Result<()> {
    let mut client = match DaemonClient::connect().await {
        Ok(c) => c,
        Err(_) => return print_not_running(format),
    };
    let version = client.hello().await?;
    format_or_json(format, &serde_json::json!({ "running": true, "version": version }), || {
        println!("taskd {version} running");
    })
}

fn print_not_running(format: OutputFormat) -> Result<()> {
    format_or_json(format, &serde_json::json!({ "running": false }), || println!("Daemon is not running"))
}
