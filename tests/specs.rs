//! Workspace-level integration tests: spawn the real `taskd`/`tj`
//! binaries and drive them end to end. One module per scenario area,
//! mirroring `crates/*`.

#[path = "prelude.rs"]
mod prelude;

#[path = "specs/cli/help.rs"]
mod cli_help;

#[path = "specs/daemon/lifecycle.rs"]
mod daemon_lifecycle;

#[path = "specs/task/submit_and_status.rs"]
mod task_submit_and_status;
