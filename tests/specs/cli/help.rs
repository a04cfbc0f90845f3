//! CLI help output specs

use crate::prelude::*;

#[test]
fn tj_help_shows_usage() {
    Scenario::new().tj().args(&["--help"]).passes().stdout_has("Usage:");
}

#[test]
fn tj_version_shows_version() {
    Scenario::new().tj().args(&["--version"]).passes().stdout_has("0.2");
}

#[test]
fn tj_daemon_help_shows_subcommands() {
    Scenario::new()
        .tj()
        .args(&["daemon", "--help"])
        .passes()
        .stdout_has("start")
        .stdout_has("stop")
        .stdout_has("status");
}

#[test]
fn tj_schedule_help_shows_subcommands() {
    Scenario::new()
        .tj()
        .args(&["schedule", "--help"])
        .passes()
        .stdout_has("create")
        .stdout_has("list")
        .stdout_has("remove");
}
