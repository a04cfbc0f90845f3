// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Patterns worth a paper trail but not worth refusing outright: package
//! installs, network fetches, and other commands that are routine for a
//! coding assistant but useful to have logged for postmortem review.

use regex::RegexSet;
use std::sync::LazyLock;

const PATTERNS: &[(&str, &str)] = &[
    ("package install", r"\b(pip|pip3|npm|yarn|pnpm|cargo|gem)\s+(install|add)\b"),
    ("apt package install", r"\bapt(-get)?\s+install\b"),
    ("outbound network fetch", r"\b(curl|wget)\s+https?://"),
    ("git clone", r"\bgit\s+clone\s+"),
    ("environment variable read", r"\$\{?(API_KEY|TOKEN|SECRET)\w*\}?"),
    ("background process", r"&\s*$"),
    ("docker invocation", r"\bdocker\s+(run|exec|build)\b"),
    ("process kill by name", r"\bpkill\b|\bkillall\b"),
    ("chmod on project files", r"\bchmod\s+\+x\b"),
    ("write outside working dir via absolute path", r">\s*/(tmp|var|opt)/"),
    ("env var export", r"(^|[;&|]\s*)export\s+\w+="),
    ("su to non-root user", r"\bsu\s+\w+\s*$"),
];

#[allow(clippy::expect_used)]
static RULE_SET: LazyLock<RegexSet> = LazyLock::new(|| {
    let patterns: Vec<&str> = PATTERNS.iter().map(|(_, p)| *p).collect();
    RegexSet::new(&patterns).expect("tier3 patterns are valid regex")
});

/// One tier-3 match, recorded for the audit log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Audited {
    pub label: &'static str,
    pub line: String,
}

/// Scan `text` against the tier-3 audit-log patterns, emitting one
/// `tracing::warn!` per match and returning the full list for callers
/// that also want to persist it (e.g. the debug sidecar).
pub fn scan(text: &str) -> Vec<Audited> {
    let set = &*RULE_SET;
    let mut audited = Vec::new();
    for line in text.lines() {
        for idx in set.matches(line).iter() {
            let (label, pattern) = PATTERNS[idx];
            tracing::warn!(pattern, line, "tier3 command audited");
            audited.push(Audited { label, line: line.to_string() });
        }
    }
    audited
}

#[cfg(test)]
#[path = "tier3_tests.rs"]
mod tests;
