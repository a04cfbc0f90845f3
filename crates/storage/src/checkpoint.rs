// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ties the WAL and snapshot together into one recovery/checkpoint cycle.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::event::Event;
use crate::snapshot::{Snapshot, SnapshotError};
use crate::state::TaskdState;
use crate::wal::{Wal, WalError};

#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error(transparent)]
    Wal(#[from] WalError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// Load the most recent snapshot, if any, defaulting to empty state when
/// there is none (first boot).
pub fn load_snapshot(path: impl AsRef<Path>) -> Result<(TaskdState, u64), CheckpointError> {
    match Snapshot::load(path)? {
        Some(snap) => Ok((snap.state, snap.seq)),
        None => Ok((TaskdState::default(), 0)),
    }
}

/// Owns the WAL and drives the replay-then-checkpoint cycle: on startup,
/// loads the last snapshot and replays everything after it; at runtime,
/// periodically snapshots and truncates the WAL so it never grows past a
/// single checkpoint interval's worth of entries.
pub struct Checkpointer {
    wal_path: PathBuf,
    snapshot_path: PathBuf,
    wal: Wal<Event>,
}

impl Checkpointer {
    /// Open the WAL, replay anything after the last snapshot into
    /// `state`, and return the ready checkpointer alongside the
    /// recovered state.
    pub fn open(
        wal_path: impl Into<PathBuf>,
        snapshot_path: impl Into<PathBuf>,
    ) -> Result<(Self, TaskdState), CheckpointError> {
        let wal_path = wal_path.into();
        let snapshot_path = snapshot_path.into();

        let (mut state, processed_seq) = load_snapshot(&snapshot_path)?;
        let wal: Wal<Event> = Wal::open(&wal_path, processed_seq)?;

        let recovered = wal.entries_after(processed_seq)?;
        let replayed = recovered.len();
        for entry in &recovered {
            state.apply_event(&entry.event);
        }
        if replayed > 0 {
            info!(replayed, "replayed WAL entries since last snapshot");
        }

        Ok((Self { wal_path, snapshot_path, wal }, state))
    }

    /// Append one event and apply it to `state` for immediate visibility,
    /// without waiting for the next flush/checkpoint.
    pub fn append(&mut self, state: &mut TaskdState, event: Event) -> Result<u64, CheckpointError> {
        let seq = self.wal.append(&event)?;
        state.apply_event(&event);
        if self.wal.needs_flush() {
            self.wal.flush()?;
        }
        Ok(seq)
    }

    /// Write a snapshot of `state` at the WAL's current write position,
    /// then truncate the WAL to only the entries after it.
    pub fn checkpoint(&mut self, state: &TaskdState) -> Result<(), CheckpointError> {
        self.wal.flush()?;
        let seq = self.wal.write_seq();
        let snapshot = Snapshot::new(seq, state.clone(), chrono::Utc::now());
        snapshot.save(&self.snapshot_path)?;
        self.wal.mark_processed(seq);
        self.wal.truncate_before(seq + 1)?;
        info!(seq, path = %self.wal_path.display(), "checkpointed state");
        Ok(())
    }

    pub fn wal_path(&self) -> &Path {
        &self.wal_path
    }
}

#[cfg(test)]
#[path = "checkpoint_tests.rs"]
mod tests;
