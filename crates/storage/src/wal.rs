// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only, line-delimited-JSON write-ahead log.
//!
//! Each line is one `WalEntry<T>`. `seq` is a monotonic counter assigned
//! at append time, independent of line number, so a truncated or
//! corrupted log never reuses a sequence number already handed out.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One logged fact, tagged with its WAL sequence number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalEntry<T> {
    pub seq: u64,
    pub event: T,
}

const FLUSH_THRESHOLD: usize = 100;
const MAX_BAK_FILES: u32 = 3;

/// Pick the next `.bak` / `.bak.N` path, rotating older backups out.
/// Keeps up to [`MAX_BAK_FILES`] generations.
fn rotate_bak_path(path: &Path) -> PathBuf {
    let bak = |n: u32| {
        if n == 1 {
            path.with_extension("bak")
        } else {
            path.with_extension(format!("bak.{n}"))
        }
    };

    let oldest = bak(MAX_BAK_FILES);
    if oldest.exists() {
        let _ = std::fs::remove_file(&oldest);
    }
    for n in (1..MAX_BAK_FILES).rev() {
        let src = bak(n);
        if src.exists() {
            let _ = std::fs::rename(&src, bak(n + 1));
        }
    }
    bak(1)
}

/// A write-ahead log of `T` events, backed by a single append-only file.
pub struct Wal<T> {
    path: PathBuf,
    file: File,
    write_seq: u64,
    processed_seq: u64,
    /// Byte offset in the file up to which `next_unprocessed` has read.
    read_offset: u64,
    pending_since_flush: usize,
    last_flush: Instant,
    _marker: std::marker::PhantomData<T>,
}

impl<T> Wal<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Open (creating if absent) the WAL at `path`, validating it line by
    /// line. Any line at or after the first undecodable one — malformed
    /// JSON, a truncated write, or raw binary — is treated as corruption:
    /// the original file is rotated to `.bak` and a clean file containing
    /// only the valid prefix is written in its place.
    ///
    /// `processed_seq` seeds [`Self::processed_seq`], normally the `seq`
    /// recorded in the last loaded snapshot.
    pub fn open(path: impl AsRef<Path>, processed_seq: u64) -> Result<Self, WalError> {
        let path = path.as_ref().to_path_buf();

        let (valid_entries, write_seq, was_corrupt) = Self::read_valid_prefix(&path)?;

        if was_corrupt {
            let bak = rotate_bak_path(&path);
            if path.exists() {
                let _ = std::fs::rename(&path, &bak);
            }
            let mut clean = OpenOptions::new().create(true).write(true).truncate(true).open(&path)?;
            for entry in &valid_entries {
                let line = serde_json::to_string(entry)?;
                writeln!(clean, "{line}")?;
            }
            clean.flush()?;
        }

        let file = OpenOptions::new().create(true).read(true).append(true).open(&path)?;

        Ok(Self {
            path,
            file,
            write_seq,
            processed_seq,
            read_offset: 0,
            pending_since_flush: 0,
            last_flush: Instant::now(),
            _marker: std::marker::PhantomData,
        })
    }

    /// Decode every line in `path` up to (not including) the first one
    /// that fails to parse as a valid `WalEntry<T>` line. Returns the
    /// valid entries, the highest `seq` among them, and whether any
    /// trailing garbage was found (i.e. the file needs rewriting).
    fn read_valid_prefix(path: &Path) -> Result<(Vec<WalEntry<T>>, u64, bool), WalError> {
        if !path.exists() {
            return Ok((Vec::new(), 0, false));
        }
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut entries = Vec::new();
        let mut max_seq = 0u64;
        let mut corrupt = false;

        for raw in reader.split(b'\n') {
            let raw = raw?;
            if raw.is_empty() {
                continue;
            }
            let Ok(line) = std::str::from_utf8(&raw) else {
                corrupt = true;
                break;
            };
            match serde_json::from_str::<WalEntry<T>>(line) {
                Ok(entry) => {
                    max_seq = max_seq.max(entry.seq);
                    entries.push(entry);
                }
                Err(_) => {
                    corrupt = true;
                    break;
                }
            }
        }

        Ok((entries, max_seq, corrupt))
    }

    /// Append one event, returning its assigned sequence number. Buffered
    /// in the OS page cache until [`Self::flush`] or the threshold in
    /// [`Self::needs_flush`] is crossed.
    pub fn append(&mut self, event: &T) -> Result<u64, WalError> {
        self.write_seq += 1;
        let entry = WalEntry { seq: self.write_seq, event };
        let line = serde_json::to_string(&entry)?;
        writeln!(self.file, "{line}")?;
        self.pending_since_flush += 1;
        Ok(self.write_seq)
    }

    pub fn flush(&mut self) -> Result<(), WalError> {
        self.file.flush()?;
        self.pending_since_flush = 0;
        self.last_flush = Instant::now();
        Ok(())
    }

    /// Whether the caller should call [`Self::flush`] now: either the
    /// pending-write count or the time since the last flush has crossed
    /// the threshold.
    pub fn needs_flush(&self) -> bool {
        self.pending_since_flush >= FLUSH_THRESHOLD
            || (self.pending_since_flush > 0 && self.last_flush.elapsed().as_secs() >= 5)
    }

    pub fn write_seq(&self) -> u64 {
        self.write_seq
    }

    pub fn processed_seq(&self) -> u64 {
        self.processed_seq
    }

    /// Mark `seq` (and everything before it) as durably applied to the
    /// materialized state. Idempotent; only advances forward.
    pub fn mark_processed(&mut self, seq: u64) {
        self.processed_seq = self.processed_seq.max(seq);
    }

    /// Return all valid entries with `seq > self.processed_seq`, reading
    /// one at a time from where the last call left off. Stops at the
    /// first corrupt or incomplete line rather than erroring, so a
    /// torn final write from a crash never blocks recovery of everything
    /// written before it.
    pub fn next_unprocessed(&mut self) -> Result<Option<WalEntry<T>>, WalError> {
        let mut reader = BufReader::new(&self.file);
        reader.seek(SeekFrom::Start(self.read_offset))?;

        loop {
            let mut line = Vec::new();
            let read = reader.read_until(b'\n', &mut line)?;
            if read == 0 {
                return Ok(None);
            }
            if line.last() != Some(&b'\n') {
                // Torn write: don't advance the offset, so a future
                // append completing the line is re-read from here.
                return Ok(None);
            }
            self.read_offset += read as u64;
            let content = &line[..line.len() - 1];
            if content.is_empty() {
                continue;
            }
            let Ok(text) = std::str::from_utf8(content) else {
                return Ok(None);
            };
            let Ok(entry) = serde_json::from_str::<WalEntry<T>>(text) else {
                return Ok(None);
            };
            if entry.seq > self.processed_seq {
                return Ok(Some(entry));
            }
        }
    }

    /// Return every valid entry with `seq > after`, from the start of
    /// the file. Stops at the first corrupt or binary line.
    pub fn entries_after(&self, after: u64) -> Result<Vec<WalEntry<T>>, WalError> {
        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut out = Vec::new();
        for raw in reader.split(b'\n') {
            let raw = raw?;
            if raw.is_empty() {
                continue;
            }
            let Ok(line) = std::str::from_utf8(&raw) else { break };
            let Ok(entry) = serde_json::from_str::<WalEntry<T>>(line) else { break };
            if entry.seq > after {
                out.push(entry);
            }
        }
        Ok(out)
    }

    /// Rewrite the file keeping only entries with `seq >= keep_from`.
    /// Called after a snapshot so the log doesn't grow without bound.
    pub fn truncate_before(&mut self, keep_from: u64) -> Result<(), WalError> {
        let kept = self.entries_after(keep_from.saturating_sub(1))?;
        let tmp_path = self.path.with_extension("wal.tmp");
        {
            let mut tmp = OpenOptions::new().create(true).write(true).truncate(true).open(&tmp_path)?;
            for entry in &kept {
                let line = serde_json::to_string(entry)?;
                writeln!(tmp, "{line}")?;
            }
            tmp.flush()?;
        }
        std::fs::rename(&tmp_path, &self.path)?;
        self.file = OpenOptions::new().create(true).read(true).append(true).open(&self.path)?;
        self.read_offset = 0;
        Ok(())
    }
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
