//! Daemon lifecycle specs
//!
//! Verify the daemon starts, answers a version handshake, and shuts
//! down cleanly when asked.

use crate::prelude::*;

#[test]
fn daemon_starts_and_reports_its_version_through_status() {
    let scenario = Scenario::new();
    let mut daemon = start_daemon(&scenario);

    scenario.tj().args(&["daemon", "status"]).passes().stdout_has("running");

    scenario.tj().args(&["daemon", "stop"]).passes();
    let _ = daemon.wait();
}

#[test]
fn daemon_status_reports_not_running_before_start() {
    let scenario = Scenario::new();
    scenario.tj().args(&["daemon", "status"]).passes().stdout_has("not running");
}

#[test]
fn daemon_start_is_idempotent() {
    let scenario = Scenario::new();
    let mut daemon = start_daemon(&scenario);

    scenario.tj().args(&["daemon", "start"]).passes().stdout_has("already running");

    scenario.tj().args(&["daemon", "stop"]).passes();
    let _ = daemon.wait();
}
