// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Strips a markdown code fence from a Gateway response and identifies
//! which interpreter should run the body.

/// An interpreter the sandbox knows how to dispatch to, plus the file
/// extension its script should be written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Python,
    Node,
    Bash,
}

impl Language {
    pub fn program(self) -> &'static str {
        match self {
            Language::Python => "python3",
            Language::Node => "node",
            Language::Bash => "bash",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Language::Python => "py",
            Language::Node => "js",
            Language::Bash => "sh",
        }
    }

    fn from_tag(tag: &str) -> Language {
        match tag.to_lowercase().as_str() {
            "python" | "py" | "python3" => Language::Python,
            "javascript" | "js" | "node" => Language::Node,
            _ => Language::Bash,
        }
    }
}

/// Strip a single ` ```lang\n...\n``` ` fence if present, returning the
/// body and the detected language. Untagged or unfenced content defaults
/// to `Bash`.
pub fn strip_fence(text: &str) -> (String, Language) {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return (trimmed.to_string(), Language::Bash);
    };
    let Some(newline) = rest.find('\n') else {
        return (trimmed.to_string(), Language::Bash);
    };
    let tag = rest[..newline].trim();
    let body = &rest[newline + 1..];
    let body = body.strip_suffix("```").unwrap_or(body).trim_end();
    let language = if tag.is_empty() { Language::Bash } else { Language::from_tag(tag) };
    (body.to_string(), language)
}

#[cfg(test)]
#[path = "fences_tests.rs"]
mod tests;
