// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Detects a missing-package failure and retries after installing it,
//! up to a per-caller retry budget.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use regex::Regex;
use std::sync::LazyLock;
use taskd_core::ExecutionResult;

use crate::subprocess;
use crate::SandboxError;

/// How many install-and-retry cycles a run is allowed. Free-form code
/// gets a tight budget; a registered project script (expected to have a
/// stable, larger dependency surface) gets more room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryBudget {
    FreeForm,
    Project,
}

impl RetryBudget {
    pub fn max_attempts(self) -> u32 {
        match self {
            RetryBudget::FreeForm => 2,
            RetryBudget::Project => 5,
        }
    }
}

/// One language's missing-module detector plus the command that
/// installs a package for it.
struct LanguageRule {
    pattern: &'static str,
    installer: fn(&str) -> (&'static str, Vec<String>),
}

fn pip_install(pkg: &str) -> (&'static str, Vec<String>) {
    ("pip", vec!["install".to_string(), pkg.to_string()])
}

fn npm_install(pkg: &str) -> (&'static str, Vec<String>) {
    ("npm", vec!["install".to_string(), pkg.to_string()])
}

const RULES: &[LanguageRule] = &[
    LanguageRule { pattern: r"ModuleNotFoundError: No module named '(\w+)'", installer: pip_install },
    LanguageRule { pattern: r"ImportError: No module named (\w+)", installer: pip_install },
    LanguageRule { pattern: r"Cannot find module '([\w./@-]+)'", installer: npm_install },
];

#[allow(clippy::expect_used)]
static COMPILED: LazyLock<Vec<Regex>> =
    LazyLock::new(|| RULES.iter().map(|r| Regex::new(r.pattern).expect("autoinstall pattern is valid")).collect());

/// Renames some import names don't match their install name.
const PACKAGE_RENAMES: &[(&str, &str)] = &[
    ("PIL", "Pillow"),
    ("cv2", "opencv-python"),
    ("yaml", "pyyaml"),
    ("bs4", "beautifulsoup4"),
    ("sklearn", "scikit-learn"),
    ("Crypto", "pycryptodome"),
    ("dotenv", "python-dotenv"),
];

fn resolve_package_name(module: &str) -> String {
    PACKAGE_RENAMES
        .iter()
        .find(|(import_name, _)| *import_name == module)
        .map(|(_, pkg)| pkg.to_string())
        .unwrap_or_else(|| module.to_string())
}

/// Find the first missing-module match in `stderr`, if any, resolved to
/// its installable package name and the installer to run.
fn detect_missing_package(stderr: &str) -> Option<(&'static str, String, fn(&str) -> (&'static str, Vec<String>))> {
    for (rule, regex) in RULES.iter().zip(COMPILED.iter()) {
        if let Some(caps) = regex.captures(stderr) {
            let module = caps.get(1)?.as_str();
            return Some((rule.pattern, resolve_package_name(module), rule.installer));
        }
    }
    None
}

/// Run `program args` in `cwd`, and on a missing-package failure, install
/// the package and retry, up to `budget.max_attempts()` times. Returns
/// the final [`ExecutionResult`] with `auto_installed` populated with
/// every package installed along the way.
#[allow(clippy::too_many_arguments)]
pub async fn run_with_autoinstall(
    program: &str,
    args: &[String],
    cwd: &Path,
    env: &HashMap<String, String>,
    timeout: Duration,
    budget: RetryBudget,
    live: Option<std::sync::Arc<subprocess::LiveOutputBuffer>>,
) -> Result<ExecutionResult, SandboxError> {
    let mut installed = Vec::new();
    let mut attempts = 0u32;

    loop {
        let mut result = subprocess::run(program, args, cwd, env, timeout, live.clone()).await?;
        if result.success || result.timed_out {
            result.auto_installed = installed;
            return Ok(result);
        }

        if attempts >= budget.max_attempts() {
            result.auto_installed = installed;
            return Ok(result);
        }

        let Some((_pattern, package, installer)) = detect_missing_package(&result.stderr) else {
            result.auto_installed = installed;
            return Ok(result);
        };

        if installed.contains(&package) {
            // Same package detected twice: installing again won't help.
            result.auto_installed = installed;
            return Ok(result);
        }

        let (install_program, install_args) = installer(&package);
        let install_result = subprocess::run(install_program, &install_args, cwd, env, timeout, None).await?;
        attempts += 1;
        if !install_result.success {
            result.auto_installed = installed;
            return Ok(result);
        }
        installed.push(package);
    }
}

#[cfg(test)]
#[path = "autoinstall_tests.rs"]
mod tests;
