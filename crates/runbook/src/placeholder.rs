// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `{placeholder}` substitution for project command templates.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

#[allow(clippy::expect_used)]
static PLACEHOLDER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-zA-Z_][a-zA-Z0-9_]*)\}").expect("constant regex pattern is valid"));

/// Escape a string for safe use inside a single-quoted shell argument, by
/// ending the quote, inserting an escaped literal quote, and reopening it.
pub fn escape_for_shell(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}

/// Names referenced by `{name}` tokens in `template`, in first-appearance
/// order with duplicates removed.
pub fn extract_placeholders(template: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for caps in PLACEHOLDER_PATTERN.captures_iter(template) {
        let name = caps[1].to_string();
        if !seen.contains(&name) {
            seen.push(name);
        }
    }
    seen
}

/// Substitute `{name}` tokens from `values`, shell-quoting every
/// substituted value. Unknown placeholders are left as-is so a missing
/// value surfaces as a visible token rather than a silent empty string.
pub fn fill_placeholders(template: &str, values: &HashMap<String, String>) -> String {
    PLACEHOLDER_PATTERN
        .replace_all(template, |caps: &regex::Captures| match values.get(&caps[1]) {
            Some(value) => escape_for_shell(value),
            None => caps[0].to_string(),
        })
        .to_string()
}

#[cfg(test)]
#[path = "placeholder_tests.rs"]
mod tests;
