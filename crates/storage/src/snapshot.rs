// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! zstd-compressed snapshots of the materialized state.
//!
//! Snapshots store the complete state at a point in time, identified by
//! the WAL sequence number it was taken at. Recovery loads the snapshot
//! and replays WAL entries after that sequence.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::migration::{MigrationError, MigrationRegistry};
use crate::state::TaskdState;

pub const CURRENT_SNAPSHOT_VERSION: u32 = 1;
const ZSTD_LEVEL: i32 = 3;
const MAX_BAK_FILES: u32 = 3;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("migration error: {0}")]
    Migration(#[from] MigrationError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "v")]
    pub version: u32,
    pub seq: u64,
    pub state: TaskdState,
    pub created_at: DateTime<Utc>,
}

fn rotate_bak_path(path: &Path) -> PathBuf {
    let bak = |n: u32| if n == 1 { path.with_extension("bak") } else { path.with_extension(format!("bak.{n}")) };

    let oldest = bak(MAX_BAK_FILES);
    if oldest.exists() {
        let _ = fs::remove_file(&oldest);
    }
    for n in (1..MAX_BAK_FILES).rev() {
        let src = bak(n);
        if src.exists() {
            let _ = fs::rename(&src, bak(n + 1));
        }
    }
    bak(1)
}

impl Snapshot {
    pub fn new(seq: u64, state: TaskdState, created_at: DateTime<Utc>) -> Self {
        Self { version: CURRENT_SNAPSHOT_VERSION, seq, state, created_at }
    }

    /// Serialize to JSON, zstd-compress, and atomically replace `path`.
    /// Any previous file is rotated to `.bak` first so a crash mid-write
    /// never leaves recovery with neither a valid snapshot nor a backup.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let path = path.as_ref();
        let json = serde_json::to_vec(self)?;
        let compressed = zstd::encode_all(json.as_slice(), ZSTD_LEVEL)?;

        let tmp_path = path.with_extension("snap.tmp");
        {
            let mut tmp = File::create(&tmp_path)?;
            tmp.write_all(&compressed)?;
            tmp.flush()?;
        }
        if path.exists() {
            let bak = rotate_bak_path(path);
            fs::rename(path, bak)?;
        }
        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    /// Load and decompress a snapshot, migrating it to
    /// [`CURRENT_SNAPSHOT_VERSION`] first if it was written by an older
    /// version of the daemon.
    pub fn load(path: impl AsRef<Path>) -> Result<Option<Self>, SnapshotError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }
        let mut compressed = Vec::new();
        File::open(path)?.read_to_end(&mut compressed)?;
        let json = zstd::decode_all(compressed.as_slice())?;
        let raw: serde_json::Value = serde_json::from_slice(&json)?;

        let registry = MigrationRegistry::new();
        let migrated = registry.migrate_to(raw, CURRENT_SNAPSHOT_VERSION)?;
        Ok(Some(serde_json::from_value(migrated)?))
    }
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
