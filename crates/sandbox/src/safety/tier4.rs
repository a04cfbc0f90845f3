// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scans generated source text itself — Python, JS, or any other
//! language the Planner produced — rather than the shell command line.
//! Skipped entirely when the container backend is active: the container
//! is the trust boundary there, and double-scanning arbitrary source for
//! substrings produces more false refusals than it prevents harm.

use regex::RegexSet;
use std::sync::LazyLock;

const PATTERNS: &[(&str, &str)] = &[
    ("credential file read", r#"open\(['"](~|/etc|/home)[^'"]*\.(ssh|aws|netrc|git-credentials)"#),
    ("credential file read", r#"open\(['"][^'"]*\.(pem|key)['"]"#),
    ("shell=True subprocess", r"subprocess\.\w+\([^)]*shell\s*=\s*True"),
    ("os.system call", r"\bos\.system\("),
    ("recursive delete of root", r#"shutil\.rmtree\(['"]/['"]"#),
    ("recursive delete of home", r#"shutil\.rmtree\((os\.path\.expanduser\(['"]~['"]\)|['"]~['"])"#),
    ("raw socket connect", r"\bsocket\.socket\(.*SOCK_RAW"),
    ("passwd file read", r#"open\(['"]/etc/(passwd|shadow|sudoers)['"]"#),
    ("child_process exec", r"require\(.child_process.\)\.(exec|execSync|spawn)\("),
    ("eval of dynamic string", r"\beval\(\s*(input\(|request\.|os\.environ)"),
];

#[allow(clippy::expect_used)]
static RULE_SET: LazyLock<RegexSet> = LazyLock::new(|| {
    let patterns: Vec<&str> = PATTERNS.iter().map(|(_, p)| *p).collect();
    RegexSet::new(&patterns).expect("tier4 patterns are valid regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub label: &'static str,
    pub line: String,
}

/// Scan generated source `code` for content-level red flags. Callers
/// should skip this entirely when the active backend is the container
/// (see [`crate::container`]) — the container already bounds what the
/// code can reach.
pub fn scan(code: &str) -> Vec<Violation> {
    let set = &*RULE_SET;
    let mut violations = Vec::new();
    for line in code.lines() {
        for idx in set.matches(line).iter() {
            violations.push(Violation { label: PATTERNS[idx].0, line: line.to_string() });
        }
    }
    violations
}

pub fn is_blocked(code: &str) -> bool {
    code.lines().any(|line| RULE_SET.is_match(line))
}

#[cfg(test)]
#[path = "tier4_tests.rs"]
mod tests;
