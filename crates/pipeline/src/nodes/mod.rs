// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The five pipeline nodes. Each exposes a `run` function sharing the
//! same `(state, deps, now_ms, usage)` shape (Deliverer additionally
//! takes the recent-task slice it mines for recurrence suggestions) so
//! the graph can dispatch them with a plain `match` instead of a trait
//! object.

pub mod audit;
pub mod classify;
pub mod deliver;
pub mod execute;
pub mod plan;
