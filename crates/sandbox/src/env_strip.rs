// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builds a sandboxed child's environment by stripping secrets out of
//! the daemon's own, rather than adding credentials in — the inverse of
//! `adapters::credential`'s fallback chain for containerized agents.

use std::collections::HashMap;

/// Env var names the daemon's own process needs but a sandboxed child
/// must never see, beyond the generic substring rules below.
const RESERVED_EXACT: &[&str] = &["ANTHROPIC_API_KEY", "TASKD_AUTH_TOKEN", "TASKD_REMOTE_API_KEY"];

/// Case-insensitive substrings that mark a variable as secret-shaped
/// regardless of its exact name.
const RESERVED_SUBSTRINGS: &[&str] = &["KEY", "TOKEN", "SECRET", "PASSWORD", "CREDENTIAL"];

fn is_reserved(name: &str) -> bool {
    if RESERVED_EXACT.contains(&name) {
        return true;
    }
    let upper = name.to_ascii_uppercase();
    RESERVED_SUBSTRINGS.iter().any(|needle| upper.contains(needle))
}

/// The environment a sandboxed child process should inherit: everything
/// from the daemon's own environment except reserved/secret-shaped keys,
/// plus whatever task-specific overrides the caller supplies.
pub fn child_env(overrides: &HashMap<String, String>) -> HashMap<String, String> {
    let mut env: HashMap<String, String> =
        std::env::vars().filter(|(name, _)| !is_reserved(name)).collect();
    for (key, value) in overrides {
        env.insert(key.clone(), value.clone());
    }
    env
}

#[cfg(test)]
#[path = "env_strip_tests.rs"]
mod tests;
