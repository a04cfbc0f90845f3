// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Finds the files a task run produced: either an explicit `ARTIFACTS:`
//! sentinel line in stdout, or an mtime-diff of the working directory
//! taken before and after the run.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use regex::Regex;
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static ARTIFACTS_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ARTIFACTS: (\[.*\])$").expect("constant regex pattern is valid"));

const PRUNED_DIRS: &[&str] = &[".venv", "node_modules", "__pycache__", ".git"];
const EXCLUDED_SUFFIXES: &[&str] = &[".pyc", ".egg-info", ".tmp"];
const OUTPUT_EXTENSION_WHITELIST: &[&str] =
    &["png", "jpg", "jpeg", "csv", "json", "txt", "pdf", "html", "svg", "xlsx", "md"];

/// Parse an explicit `ARTIFACTS: [...]` sentinel line out of `stdout`,
/// if the generated program printed one.
pub fn from_sentinel(stdout: &str) -> Option<Vec<PathBuf>> {
    for line in stdout.lines() {
        if let Some(caps) = ARTIFACTS_LINE.captures(line.trim()) {
            if let Ok(paths) = serde_json::from_str::<Vec<String>>(&caps[1]) {
                return Some(paths.into_iter().map(PathBuf::from).collect());
            }
        }
    }
    None
}

fn is_pruned_dir(name: &str) -> bool {
    PRUNED_DIRS.contains(&name)
}

fn is_excluded_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    EXCLUDED_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

/// Recursive directory walk, pruning known noise directories, returning
/// `path -> mtime` for every regular file left. Manual rather than a
/// crate dependency: a shallow project tree never needs more than this.
/// Runs on the pipeline's async execution path, so every fs call goes
/// through `tokio::fs`.
async fn mtime_snapshot(root: &Path) -> HashMap<PathBuf, SystemTime> {
    let mut out = HashMap::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let Ok(mut entries) = tokio::fs::read_dir(&dir).await else { continue };
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            let Ok(file_type) = entry.file_type().await else { continue };
            if file_type.is_dir() {
                let name = entry.file_name();
                let name = name.to_str().unwrap_or("");
                if !is_pruned_dir(name) {
                    stack.push(path);
                }
            } else if file_type.is_file() {
                if let Ok(metadata) = entry.metadata().await {
                    if let Ok(mtime) = metadata.modified() {
                        out.insert(path, mtime);
                    }
                }
            }
        }
    }
    out
}

/// Snapshot a working directory's file mtimes before a run, for later
/// comparison via [`diff_since`].
pub async fn snapshot_before(root: &Path) -> HashMap<PathBuf, SystemTime> {
    mtime_snapshot(root).await
}

/// Files new or modified since `before`, filtered by size (non-empty)
/// and the noise-suffix exclusion list. Narrows to the output-extension
/// whitelist only when the unfiltered candidate count exceeds 20, so a
/// small project producing a handful of files isn't second-guessed.
pub async fn diff_since(root: &Path, before: &HashMap<PathBuf, SystemTime>) -> Vec<PathBuf> {
    let after = mtime_snapshot(root).await;
    let changed: Vec<PathBuf> = after
        .iter()
        .filter(|(path, mtime)| {
            if is_excluded_file(path) {
                return false;
            }
            match before.get(*path) {
                Some(prior) => *mtime > prior,
                None => true,
            }
        })
        .map(|(path, _)| path.clone())
        .collect();

    let mut candidates = Vec::with_capacity(changed.len());
    for path in changed {
        if tokio::fs::metadata(&path).await.map(|m| m.len() > 0).unwrap_or(false) {
            candidates.push(path);
        }
    }

    if candidates.len() > 20 {
        candidates.retain(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| OUTPUT_EXTENSION_WHITELIST.contains(&ext.to_ascii_lowercase().as_str()))
                .unwrap_or(false)
        });
    }

    candidates.sort();
    candidates
}

/// Resolve a run's artifacts: prefer the explicit sentinel, fall back to
/// the mtime diff.
pub async fn resolve(stdout: &str, root: &Path, before: &HashMap<PathBuf, SystemTime>) -> Vec<PathBuf> {
    match from_sentinel(stdout) {
        Some(paths) => paths,
        None => diff_since(root, before).await,
    }
}

#[cfg(test)]
#[path = "artifacts_tests.rs"]
mod tests;
