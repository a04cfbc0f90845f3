//! Task submission and status specs
//!
//! The daemon has no remote API key in this environment, so a submitted
//! task stalls early in the pipeline rather than completing — which is
//! fine, these specs only check that the task is accepted and visible.

use crate::prelude::*;

#[test]
fn submitted_task_shows_up_in_status() {
    let scenario = Scenario::new();
    let mut daemon = start_daemon(&scenario);

    scenario.tj().args(&["submit", "write a haiku about rust"]).passes().stdout_has("submitted");
    scenario.tj().args(&["status"]).passes();

    scenario.tj().args(&["daemon", "stop"]).passes();
    let _ = daemon.wait();
}

#[test]
fn cancel_with_nothing_in_flight_reports_none_cancelled() {
    let scenario = Scenario::new();
    let mut daemon = start_daemon(&scenario);

    scenario.tj().args(&["cancel"]).passes().stdout_has("No in-flight tasks");

    scenario.tj().args(&["daemon", "stop"]).passes();
    let _ = daemon.wait();
}

#[test]
fn usage_starts_at_zero() {
    let scenario = Scenario::new();
    let mut daemon = start_daemon(&scenario);

    scenario.tj().args(&["usage"]).passes().stdout_has("0");

    scenario.tj().args(&["daemon", "stop"]).passes();
    let _ = daemon.wait();
}

#[test]
fn projects_is_empty_with_no_registry_configured() {
    let scenario = Scenario::new();
    let mut daemon = start_daemon(&scenario);

    scenario.tj().args(&["projects"]).passes().stdout_has("No registered projects");

    scenario.tj().args(&["daemon", "stop"]).passes();
    let _ = daemon.wait();
}
