//! Shared harness for the `taskd-specs` integration tests.
//!
//! Each scenario gets its own `TASKD_STATE_DIR` under a fresh tempdir so
//! daemon instances never collide, then drives the real `tj` binary
//! through `assert_cmd`.

use std::path::PathBuf;

use assert_cmd::Command as AssertCommand;
use tempfile::TempDir;

/// One scenario's isolated state directory and a `tj` command builder
/// that already points at it.
pub struct Scenario {
    #[allow(dead_code)]
    dir: TempDir,
    state_dir: PathBuf,
}

impl Scenario {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let state_dir = dir.path().to_path_buf();
        Self { dir, state_dir }
    }

    pub fn tj(&self) -> CliRun {
        let mut cmd = AssertCommand::cargo_bin("tj").expect("tj binary");
        cmd.env("TASKD_STATE_DIR", &self.state_dir);
        CliRun { cmd }
    }

    pub fn taskd_binary(&self) -> PathBuf {
        assert_cmd::cargo::cargo_bin("taskd")
    }

    pub fn state_dir(&self) -> &std::path::Path {
        &self.state_dir
    }
}

/// A `tj` invocation under construction.
pub struct CliRun {
    cmd: AssertCommand,
}

impl CliRun {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn passes(mut self) -> CliOutput {
        let output = self.cmd.output().expect("run tj");
        assert!(output.status.success(), "tj exited with {:?}: {}", output.status, String::from_utf8_lossy(&output.stderr));
        CliOutput { output }
    }

    pub fn fails(mut self) -> CliOutput {
        let output = self.cmd.output().expect("run tj");
        assert!(!output.status.success(), "expected tj to fail but it exited 0");
        CliOutput { output }
    }
}

pub struct CliOutput {
    output: std::process::Output,
}

impl CliOutput {
    pub fn stdout_has(self, needle: &str) -> Self {
        let stdout = String::from_utf8_lossy(&self.output.stdout);
        assert!(stdout.contains(needle), "expected stdout to contain {needle:?}, got:\n{stdout}");
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        let stderr = String::from_utf8_lossy(&self.output.stderr);
        assert!(stderr.contains(needle), "expected stderr to contain {needle:?}, got:\n{stderr}");
        self
    }

    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).to_string()
    }
}

/// Spawn a daemon for `scenario` in the background and wait briefly for
/// its socket to appear.
pub fn start_daemon(scenario: &Scenario) -> std::process::Child {
    let child = std::process::Command::new(scenario.taskd_binary())
        .env("TASKD_STATE_DIR", scenario.state_dir())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .expect("spawn taskd");

    let socket_path = scenario.state_dir().join("taskd.sock");
    for _ in 0..50 {
        if socket_path.exists() {
            break;
        }
        std::thread::sleep(std::time::Duration::from_millis(100));
    }
    child
}
