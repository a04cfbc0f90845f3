// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! taskd-storage: write-ahead log, snapshotting, and the materialized
//! state derived from replaying them.

mod checkpoint;
mod event;
mod migration;
mod snapshot;
mod state;
mod wal;

pub use checkpoint::{load_snapshot, CheckpointError, Checkpointer};
pub use event::Event;
pub use migration::{Migration, MigrationError, MigrationRegistry};
pub use snapshot::{Snapshot, SnapshotError, CURRENT_SNAPSHOT_VERSION};
pub use state::TaskdState;
pub use wal::{Wal, WalEntry, WalError};
