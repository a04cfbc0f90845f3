// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tj` — the command-line front end for `taskd`. Talks to the daemon
//! over its Unix socket and renders whatever comes back.

mod client;
mod color;
mod commands;
mod exit_error;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::commands::daemon::DaemonCommand;
use crate::commands::schedule::ScheduleCommand;
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "tj", version, about = "Submit and track tasks on a taskd daemon", styles = color::styles())]
struct Cli {
    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Operator id, defaults to `$TASKD_USER` or "operator".
    #[arg(long, global = true)]
    user: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Submit a plain-language task.
    Submit(SubmitArgs),
    /// List tasks currently in the pipeline.
    Status,
    /// Show recent tasks, most recent first.
    History {
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
    },
    /// Show full detail for one task.
    Task { id: String },
    /// Token usage totals.
    Usage,
    /// Spend for today and the current month.
    Cost,
    /// RAM, disk, local-model, and project health.
    Health,
    /// Run a single command through the sandbox directly.
    Exec {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },
    /// View or clear the conversation history.
    Context {
        #[arg(long)]
        clear: bool,
    },
    /// Cancel every in-flight task.
    Cancel,
    /// List registered projects.
    Projects,
    /// Manage recurring jobs.
    Schedule {
        #[command(subcommand)]
        action: ScheduleCommand,
    },
    /// Run a strict-AND sequence of sub-prompts.
    Chain { steps: Vec<String> },
    /// Show the debug sidecar recorded for a task.
    Debug { id: String },
    /// Manage the background daemon process.
    Daemon {
        #[command(subcommand)]
        action: DaemonCommand,
    },
}

#[derive(Args)]
struct SubmitArgs {
    message: String,
    #[arg(long = "file")]
    files: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(exit_err) = e.downcast_ref::<exit_error::ExitError>() {
                eprintln!("{exit_err}");
                return ExitCode::from(exit_err.code as u8);
            }
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let user_id = cli.user.unwrap_or_else(client::default_user_id);
    let format = cli.format;

    match cli.command {
        Command::Submit(args) => commands::submit::handle(format, &user_id, args.message, args.files).await,
        Command::Status => commands::status::handle(format, &user_id).await,
        Command::History { limit } => commands::history::handle(format, &user_id, limit).await,
        Command::Task { id } => commands::task::handle(format, &user_id, &id).await,
        Command::Usage => commands::usage::handle(format, &user_id).await,
        Command::Cost => commands::cost::handle(format).await,
        Command::Health => commands::health::handle(format).await,
        Command::Exec { command } => commands::exec::handle(format, &user_id, command.join(" ")).await,
        Command::Context { clear } => commands::context::handle(format, &user_id, clear).await,
        Command::Cancel => commands::cancel::handle(format, &user_id).await,
        Command::Projects => commands::projects::handle(format).await,
        Command::Schedule { action } => commands::schedule::handle(action, format).await,
        Command::Chain { steps } => commands::chain::handle(format, &user_id, steps).await,
        Command::Debug { id } => commands::debug::handle(format, &id).await,
        Command::Daemon { action } => commands::daemon::handle(action, format).await,
    }
}
