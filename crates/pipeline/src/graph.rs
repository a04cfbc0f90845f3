// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The pipeline graph: a fixed node order with one conditional
//! back-edge. Built once at daemon startup and shared via `Arc<Graph>`,
//! not rebuilt per task.

use std::collections::HashMap;

use parking_lot::Mutex;
use taskd_core::{
    ApiUsageRecord, AuditVerdict, Clock, PipelineState, ProjectMemoryRecord, Stage, StageTiming, Task, TaskId,
};

use crate::deps::PipelineDeps;
use crate::error::NodeError;
use crate::nodes;

/// Marks the stage in the shared map, times `$call`, and appends a
/// `StageTiming` to the state regardless of whether the node succeeded
/// or failed — a failed node's cost still belongs in the debug sidecar.
macro_rules! run_node {
    ($self:expr, $state:expr, $stage:expr, $clock:expr, $now_ms:expr, $call:expr) => {{
        $self.mark_stage($state.task_id, $stage);
        let __t0 = $clock.now();
        let __result = $call;
        let __duration_ms = $clock.now().duration_since(__t0).as_millis() as u64;
        $state.timings.push(StageTiming { stage: $stage, started_at_ms: $now_ms, duration_ms: __duration_ms });
        __result
    }};
}

/// Tracks which stage each in-flight task is currently in, read by the
/// Coordinator's status poller and written as each node runs.
pub struct Graph {
    stage_map: Mutex<HashMap<TaskId, Stage>>,
}

impl Graph {
    pub fn new() -> Self {
        Self { stage_map: Mutex::new(HashMap::new()) }
    }

    pub fn current_stage(&self, task_id: TaskId) -> Option<Stage> {
        self.stage_map.lock().get(&task_id).copied()
    }

    fn mark_stage(&self, task_id: TaskId, stage: Stage) {
        self.stage_map.lock().insert(task_id, stage);
    }

    fn clear_stage(&self, task_id: TaskId) {
        self.stage_map.lock().remove(&task_id);
    }

    /// Run one task through the graph to completion: Classify, then
    /// Plan/Execute/Audit until `Pass` or the retry budget is spent,
    /// then Deliver. Returns the project-memory lesson the Deliverer
    /// distilled, if any.
    pub async fn run<C: Clock>(
        &self,
        state: &mut PipelineState,
        deps: &PipelineDeps,
        clock: &C,
        usage: &mut Vec<ApiUsageRecord>,
        recent_tasks: &[Task],
    ) -> Result<Option<ProjectMemoryRecord>, NodeError> {
        let task_id = state.task_id;

        let now_ms = clock.epoch_ms();
        run_node!(self, state, Stage::Classify, clock, now_ms, nodes::classify::run(state, deps, now_ms, usage).await)?;

        loop {
            let now_ms = clock.epoch_ms();
            run_node!(self, state, Stage::Plan, clock, now_ms, nodes::plan::run(state, deps, now_ms, usage).await)?;

            let now_ms = clock.epoch_ms();
            run_node!(self, state, Stage::Execute, clock, now_ms, nodes::execute::run(state, deps, now_ms, usage).await)?;

            let now_ms = clock.epoch_ms();
            run_node!(self, state, Stage::Audit, clock, now_ms, nodes::audit::run(state, deps, now_ms, usage).await)?;

            let passed = state.verdict == Some(AuditVerdict::Pass);
            let exhausted = !state.retries_remaining(deps.max_retries);
            if passed || exhausted {
                break;
            }
        }

        self.mark_stage(task_id, Stage::Deliver);
        let started_at_ms = clock.epoch_ms();
        let t0 = clock.now();
        let memory = nodes::deliver::run(state, deps, started_at_ms, usage, recent_tasks).await?;
        let duration_ms = clock.now().duration_since(t0).as_millis() as u64;
        state.timings.push(StageTiming { stage: Stage::Deliver, started_at_ms, duration_ms });

        self.clear_stage(task_id);
        Ok(memory)
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "graph_tests.rs"]
mod tests;
