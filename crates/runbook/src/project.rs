// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The project registry: a human-edited HCL file naming the projects the
//! Classifier and Planner know about.
//!
//! ```hcl
//! project "dashflow" {
//!   path        = "/home/op/work/dashflow"
//!   description = "internal metrics dashboard"
//!   triggers    = ["dashflow", "the dashboard"]
//!   timeout_s   = 120
//!
//!   commands = {
//!     test  = "pytest {path}"
//!     lint  = "ruff check {path}"
//!   }
//! }
//! ```
//!
//! Block order is preserved (`indexmap`, matching the teacher's import
//! resolution combination of `hcl-rs` + `indexmap`) so "longest trigger
//! wins" iterates projects in file order when trigger lengths tie.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;

const DEFAULT_TIMEOUT_S: u64 = 300;

fn default_timeout_s() -> u64 {
    DEFAULT_TIMEOUT_S
}

#[derive(Debug, Clone, Deserialize)]
struct ProjectBlock {
    path: PathBuf,
    #[serde(default)]
    description: String,
    #[serde(default)]
    commands: HashMap<String, String>,
    #[serde(default)]
    env_path: Option<PathBuf>,
    #[serde(default = "default_timeout_s")]
    timeout_s: u64,
    #[serde(default)]
    requires_file: bool,
    #[serde(default)]
    triggers: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct RegistryFile {
    #[serde(default, rename = "project")]
    projects: IndexMap<String, ProjectBlock>,
}

/// One registered project: a working directory plus a named set of
/// command templates the Executor is allowed to run inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub name: String,
    pub path: PathBuf,
    pub description: String,
    pub commands: HashMap<String, String>,
    pub env_path: Option<PathBuf>,
    pub timeout_s: u64,
    pub requires_file: bool,
    pub triggers: Vec<String>,
}

impl Project {
    /// True when `message` mentions any of this project's trigger
    /// phrases (case-insensitive substring match).
    pub fn matches(&self, message: &str) -> bool {
        let lower = message.to_lowercase();
        self.triggers.iter().any(|t| lower.contains(&t.to_lowercase()))
    }

    /// Longest matching trigger phrase, used to rank competing projects.
    fn longest_match(&self, message: &str) -> Option<usize> {
        let lower = message.to_lowercase();
        self.triggers.iter().filter(|t| lower.contains(&t.to_lowercase())).map(|t| t.len()).max()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("failed to read project registry {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("failed to parse project registry {path}: {source}")]
    Parse { path: PathBuf, source: hcl::Error },
}

/// The set of projects the Classifier and Planner consult. Loaded once at
/// daemon startup and held behind an `Arc`, never rebuilt per task.
#[derive(Debug, Clone, Default)]
pub struct ProjectRegistry {
    projects: Vec<Project>,
}

impl ProjectRegistry {
    pub fn empty() -> Self {
        Self { projects: Vec::new() }
    }

    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let text =
            std::fs::read_to_string(path).map_err(|source| RegistryError::Read { path: path.to_path_buf(), source })?;
        Self::parse(&text, path)
    }

    fn parse(text: &str, path: &Path) -> Result<Self, RegistryError> {
        let file: RegistryFile =
            hcl::from_str(text).map_err(|source| RegistryError::Parse { path: path.to_path_buf(), source })?;
        let projects = file
            .projects
            .into_iter()
            .map(|(name, block)| Project {
                name,
                path: block.path,
                description: block.description,
                commands: block.commands,
                env_path: block.env_path,
                timeout_s: block.timeout_s,
                requires_file: block.requires_file,
                triggers: block.triggers,
            })
            .collect();
        Ok(Self { projects })
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn by_name(&self, name: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.name == name)
    }

    /// The project whose trigger phrase is the longest match in
    /// `message`, preferring the first-declared project on a length tie —
    /// the "longest trigger wins" rule the Classifier's fast path uses.
    pub fn match_trigger(&self, message: &str) -> Option<&Project> {
        self.projects
            .iter()
            .filter_map(|p| p.longest_match(message).map(|len| (len, p)))
            .max_by_key(|(len, _)| *len)
            .map(|(_, p)| p)
    }
}

#[cfg(test)]
#[path = "project_tests.rs"]
mod tests;
