// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Snapshot schema migrations.
//!
//! A snapshot is stored as a bare JSON `Value` wrapper (`{v, seq, state}`)
//! rather than directly as `Snapshot<TaskdState>`, so an old snapshot can
//! be upgraded field-by-field before it is deserialized into the current
//! `TaskdState` shape.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MigrationError {
    #[error("snapshot version {0} is newer than the running daemon's version {1}")]
    TooNew(u32, u32),
    #[error("no migration path from version {0} to {1}")]
    NoPath(u32, u32),
    #[error("malformed snapshot: {0}")]
    Malformed(String),
}

/// One version-to-version upgrade step.
pub trait Migration {
    fn source_version(&self) -> u32;
    fn target_version(&self) -> u32;
    fn migrate(&self, snapshot: &mut Value) -> Result<(), MigrationError>;
}

/// Ordered set of migrations, applied as a chain from a snapshot's
/// recorded version up to the version the running daemon expects.
pub struct MigrationRegistry {
    pub(crate) migrations: Vec<Box<dyn Migration>>,
}

impl Default for MigrationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MigrationRegistry {
    pub fn new() -> Self {
        Self { migrations: Vec::new() }
    }

    /// Migrate `snapshot` (the `{v, seq, state}` wrapper) from its
    /// recorded `v` up to `target_version`, applying registered
    /// migrations in sequence. A no-op if already at `target_version`.
    pub fn migrate_to(&self, mut snapshot: Value, target_version: u32) -> Result<Value, MigrationError> {
        let current = snapshot
            .get("v")
            .and_then(Value::as_u64)
            .ok_or_else(|| MigrationError::Malformed("missing \"v\" field".into()))? as u32;

        if current == target_version {
            return Ok(snapshot);
        }
        if current > target_version {
            return Err(MigrationError::TooNew(current, target_version));
        }

        let mut version = current;
        while version < target_version {
            let step = self
                .migrations
                .iter()
                .find(|m| m.source_version() == version)
                .ok_or(MigrationError::NoPath(current, target_version))?;

            step.migrate(&mut snapshot)?;
            version = step.target_version();
            snapshot["v"] = Value::from(version);
        }

        Ok(snapshot)
    }
}

#[cfg(test)]
#[path = "migration_tests.rs"]
mod tests;
