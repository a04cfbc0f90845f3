// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Text/JSON dual-mode printing for every `tj` subcommand. Each render
//! function takes the wire DTO straight off `DaemonClient` and either
//! prints a colorized block or pretty JSON.

use clap::ValueEnum;
use serde::Serialize;
use taskd_wire::{
    ChainStepResult, ConversationTurnView, CostReport, DebugSidecarView, HealthReport,
    HistoryEntry, ProjectSummary, ScheduleEntry, TaskDetail, TaskSummary, UsageTotals,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Format a millisecond epoch timestamp as relative time ("5s", "2m", "1h", "3d")
pub fn format_time_ago(epoch_ms: u64) -> String {
    if epoch_ms == 0 {
        return "-".to_string();
    }
    let now_ms =
        std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).unwrap_or_default().as_millis() as u64;
    let elapsed_secs = now_ms.saturating_sub(epoch_ms) / 1000;
    if elapsed_secs < 60 {
        format!("{elapsed_secs}s")
    } else if elapsed_secs < 3600 {
        format!("{}m", elapsed_secs / 60)
    } else if elapsed_secs < 86400 {
        format!("{}h", elapsed_secs / 3600)
    } else {
        format!("{}d", elapsed_secs / 86400)
    }
}

/// Render as pretty JSON when `format` is `Json`, otherwise call `text_fn`.
pub fn format_or_json<T: Serialize>(format: OutputFormat, data: &T, text_fn: impl FnOnce()) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(data)?),
        OutputFormat::Text => text_fn(),
    }
    Ok(())
}

pub fn print_task_summaries(format: OutputFormat, tasks: &[TaskSummary]) -> anyhow::Result<()> {
    format_or_json(format, tasks, || {
        if tasks.is_empty() {
            println!("No tasks in flight");
            return;
        }
        for t in tasks {
            let stage = t.stage.as_deref().unwrap_or("-");
            let task_type = t.task_type.map(|tt| tt.to_string()).unwrap_or_else(|| "-".to_string());
            println!(
                "{}  {:<10} {:<10} {:<9} {}",
                crate::color::header(t.id.short(12)),
                format!("{:?}", t.status).to_lowercase(),
                task_type,
                stage,
                t.message_preview,
            );
        }
    })
}

pub fn print_history(format: OutputFormat, entries: &[HistoryEntry]) -> anyhow::Result<()> {
    format_or_json(format, entries, || {
        if entries.is_empty() {
            println!("No task history");
            return;
        }
        for e in entries {
            let task_type = e.task_type.map(|tt| tt.to_string()).unwrap_or_else(|| "-".to_string());
            let duration = e.duration_ms.map(|ms| format!("{}s", ms / 1000)).unwrap_or_else(|| "-".to_string());
            println!(
                "{}  {:<10} {:<10} {:<8} {}",
                crate::color::header(e.id.short(12)),
                format!("{:?}", e.status).to_lowercase(),
                task_type,
                duration,
                crate::color::muted(&format_time_ago(e.created_at_ms)),
            );
        }
    })
}

pub fn print_task_detail(format: OutputFormat, task: Option<Box<TaskDetail>>) -> anyhow::Result<()> {
    format_or_json(format, &task, || match task.as_deref() {
        None => println!("No matching task"),
        Some(t) => {
            println!("{} {}", crate::color::header("task"), t.id);
            println!("status:  {:?}", t.status);
            if let Some(tt) = t.task_type {
                println!("type:    {tt}");
            }
            println!("message: {}", t.message);
            println!("created: {}", crate::color::muted(&format_time_ago(t.created_at_ms)));
            if let Some(result) = &t.result {
                println!("\n{result}");
            }
            if let Some(error) = &t.error {
                eprintln!("\nerror: {error}");
            }
            println!("\ntokens: {} in / {} out / {} thinking", t.usage.input, t.usage.output, t.usage.thinking);
            if t.retry_count > 0 {
                println!("retries: {}", t.retry_count);
            }
            for line in &t.live_output {
                println!("{line}");
            }
        }
    })
}

pub fn print_usage(format: OutputFormat, totals: &UsageTotals) -> anyhow::Result<()> {
    format_or_json(format, totals, || {
        println!("input tokens:    {}", totals.input_tokens);
        println!("output tokens:   {}", totals.output_tokens);
        println!("thinking tokens: {}", totals.thinking_tokens);
    })
}

pub fn print_cost(format: OutputFormat, report: &CostReport) -> anyhow::Result<()> {
    format_or_json(format, report, || {
        println!("today:  ${:.2}", report.today_usd);
        println!("month:  ${:.2}", report.month_usd);
        if !report.by_model.is_empty() {
            println!();
            for m in &report.by_model {
                println!("{:<28} {:>8} in  {:>8} out  ${:.4}", m.model, m.input_tokens, m.output_tokens, m.cost_usd);
            }
        }
    })
}

pub fn print_health(format: OutputFormat, report: &HealthReport) -> anyhow::Result<()> {
    format_or_json(format, report, || {
        println!("ram available:      {} MB", report.ram_available_mb);
        println!("disk free:          {} MB", report.disk_free_mb);
        println!("local model:        {}", if report.local_model_available { "up" } else { "down" });
        println!("container backend:  {}", if report.container_backend_available { "up" } else { "down" });
        println!("in-flight tasks:    {}", report.in_flight_count);
        println!("api calls today:    {}", report.api_calls_today);
        if !report.projects.is_empty() {
            println!();
            for p in &report.projects {
                let status = if p.path_exists { "ok" } else { "missing path" };
                println!("{:<24} {}", p.name, crate::color::muted(status));
            }
        }
    })
}

pub fn print_exec_result(
    format: OutputFormat,
    exit_code: Option<i32>,
    stdout: &str,
    stderr: &str,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let obj = serde_json::json!({ "exit_code": exit_code, "stdout": stdout, "stderr": stderr });
            println!("{}", serde_json::to_string_pretty(&obj)?);
        }
        OutputFormat::Text => {
            print!("{stdout}");
            eprint!("{stderr}");
            match exit_code {
                Some(code) => println!("{}", crate::color::muted(&format!("exit {code}"))),
                None => println!("{}", crate::color::muted("exit: killed")),
            }
        }
    }
    Ok(())
}

pub fn print_context(format: OutputFormat, turns: &[ConversationTurnView]) -> anyhow::Result<()> {
    format_or_json(format, turns, || {
        if turns.is_empty() {
            println!("No conversation history");
            return;
        }
        for turn in turns {
            println!("{}: {}", crate::color::header(&turn.role), turn.content);
        }
    })
}

pub fn print_cancelled(format: OutputFormat, cancelled: &[taskd_core::TaskId]) -> anyhow::Result<()> {
    format_or_json(format, cancelled, || {
        if cancelled.is_empty() {
            println!("No in-flight tasks to cancel");
            return;
        }
        for id in cancelled {
            println!("cancelled {}", id.short(12));
        }
    })
}

pub fn print_projects(format: OutputFormat, projects: &[ProjectSummary]) -> anyhow::Result<()> {
    format_or_json(format, projects, || {
        if projects.is_empty() {
            println!("No registered projects");
            return;
        }
        for p in projects {
            println!(
                "{:<20} {:<40} {}",
                crate::color::header(&p.name),
                crate::color::muted(&p.path),
                p.description
            );
        }
    })
}

pub fn print_schedule_entry(format: OutputFormat, entry: &ScheduleEntry) -> anyhow::Result<()> {
    format_or_json(format, entry, || {
        println!("{} every {}s -> {}", crate::color::header(&entry.id), entry.interval_s, entry.target);
    })
}

pub fn print_schedule_entries(format: OutputFormat, entries: &[ScheduleEntry]) -> anyhow::Result<()> {
    format_or_json(format, entries, || {
        if entries.is_empty() {
            println!("No recurring jobs");
            return;
        }
        for e in entries {
            println!("{:<24} every {:<6}s -> {}", crate::color::header(&e.id), e.interval_s, e.target);
        }
    })
}

pub fn print_schedule_removed(format: OutputFormat, id: &str) -> anyhow::Result<()> {
    format_or_json(format, &id, || println!("removed {id}"))
}

pub fn print_chain_result(
    format: OutputFormat,
    steps: &[ChainStepResult],
    failed_at: Option<usize>,
) -> anyhow::Result<()> {
    let body = serde_json::json!({ "steps": steps, "failed_at": failed_at });
    format_or_json(format, &body, || {
        for s in steps {
            let mark = if s.passed { "ok" } else { "FAILED" };
            println!("step {}: {} ({})", s.step_index, mark, s.task_id.short(12));
            if let Some(path) = &s.artifact_path {
                println!("  -> {path}");
            }
        }
        if let Some(idx) = failed_at {
            println!("\nchain stopped after step {idx}");
        }
    })
}

pub fn print_debug_sidecar(format: OutputFormat, sidecar: Option<Box<DebugSidecarView>>) -> anyhow::Result<()> {
    format_or_json(format, &sidecar, || match sidecar.as_deref() {
        None => println!("No matching task"),
        Some(s) => {
            println!("{} {}", crate::color::header("task"), s.task_id);
            println!("message: {}", s.message);
            if let Some(tt) = s.task_type {
                println!("type:    {tt}");
            }
            for (stage, ms) in &s.stage_durations_ms {
                println!("  {stage:<10} {ms}ms");
            }
            println!("total:   {}ms", s.total_duration_ms);
            if let Some(verdict) = &s.verdict {
                println!("verdict: {verdict}");
            }
            println!("retries: {}", s.retry_count);
        }
    })
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
