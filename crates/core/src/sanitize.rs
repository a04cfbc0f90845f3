// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error and message sanitisation for user-visible strings.
//!
//! Full detail always goes to the server log via `tracing`; anything that
//! reaches a chat front-end passes through here first.

/// Strip the operator's home directory prefix, bearer/API-key-shaped
/// fragments, and basic-auth userinfo from a message before it is shown
/// to the end user.
pub fn sanitize_message(msg: &str) -> String {
    let mut out = strip_home_prefix(msg);
    out = redact_pattern(&out, "Bearer ", ' ');
    out = redact_pattern(&out, "sk-", ' ');
    out = redact_pattern(&out, "sk-ant-", ' ');
    out
}

/// Replace the operator's `$HOME` with `~` wherever it appears as a path
/// prefix. Mirrors the debug sidecar's message sanitisation rule.
pub fn strip_home_prefix(msg: &str) -> String {
    match std::env::var("HOME") {
        Ok(home) if !home.is_empty() => msg.replace(&home, "~"),
        _ => msg.to_string(),
    }
}

/// Replace `prefix<token>` runs (token = non-whitespace up to `stop`) with
/// `prefix***`. Used for API key / bearer token fragments that should
/// never reach a chat transcript.
fn redact_pattern(msg: &str, prefix: &str, stop: char) -> String {
    let mut out = String::with_capacity(msg.len());
    let mut rest = msg;
    while let Some(idx) = rest.find(prefix) {
        out.push_str(&rest[..idx]);
        out.push_str(prefix);
        out.push_str("***");
        let after = &rest[idx + prefix.len()..];
        let cut = after.find(stop).unwrap_or(after.len());
        rest = &after[cut..];
    }
    out.push_str(rest);
    out
}

/// Truncate to at most `max_chars` UTF-8 characters, appending an
/// ellipsis marker when truncated. Used for the debug sidecar's message
/// field and for feedback/lesson text caps.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars).collect();
    out.push('\u{2026}');
    out
}

#[cfg(test)]
#[path = "sanitize_tests.rs"]
mod tests;
