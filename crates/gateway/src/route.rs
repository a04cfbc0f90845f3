// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pure routing decision: which provider should serve one Gateway call.
//! Kept as a plain function over a small context struct rather than a
//! stateful router object, so the rules are unit-testable without any
//! I/O.

use crate::purpose::{Complexity, Purpose};

/// Everything the routing rule needs to know about the moment, decoupled
/// from how the caller obtained it (health probe, memory reading, usage
/// ledger).
#[derive(Debug, Clone, Copy)]
pub struct RouteContext {
    pub local_healthy: bool,
    pub ram_low: bool,
    /// Fraction of the daily spend cap already used, in `[0.0, 1.0+]`.
    pub spend_ratio: f64,
}

/// Which provider a call should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Remote,
    Local,
}

/// Decide remote vs. local for one call. Order matters: audit and
/// code-gen always go remote regardless of budget pressure; budget
/// pressure then forces low-complexity calls local even outside the
/// classify/plan happy path; everything else defaults remote.
pub fn route(purpose: Purpose, complexity: Complexity, ctx: &RouteContext) -> Route {
    if matches!(purpose, Purpose::Audit | Purpose::CodeGen) {
        return Route::Remote;
    }
    if complexity == Complexity::Low && ctx.spend_ratio > 0.7 {
        return Route::Local;
    }
    if complexity == Complexity::Low
        && matches!(purpose, Purpose::Classify | Purpose::Plan)
        && ctx.local_healthy
        && ctx.ram_low
    {
        return Route::Local;
    }
    Route::Remote
}

#[cfg(test)]
#[path = "route_tests.rs"]
mod tests;
