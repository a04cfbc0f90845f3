// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reads the operator's coding-standards file, truncated to a char
//! budget. No parsing: the file's content is dropped into the Planner's
//! prompt verbatim.

use std::path::Path;

/// Read `path`, truncated to `cap_chars` UTF-8 characters. Returns an
/// empty string (not an error) when `path` does not exist, since the
/// coding-standards file is optional.
pub fn load(path: &Path, cap_chars: usize) -> std::io::Result<String> {
    if !path.exists() {
        return Ok(String::new());
    }
    let text = std::fs::read_to_string(path)?;
    Ok(truncate_chars(&text, cap_chars))
}

fn truncate_chars(text: &str, cap_chars: usize) -> String {
    if text.chars().count() <= cap_chars {
        return text.to_string();
    }
    text.chars().take(cap_chars).collect()
}

#[cfg(test)]
#[path = "standards_tests.rs"]
mod tests;
