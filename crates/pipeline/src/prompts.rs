// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Planner's per-`TaskType` system prompt table.

use taskd_core::TaskType;

/// Appended to every planning prompt regardless of task type: what the
/// sandbox can and cannot do, so the model never plans an action the
/// Executor would have to refuse.
pub const CAPABILITIES_BLOCK: &str = "\
You are planning a task that will run inside a constrained sandbox. \
The sandbox can execute shell commands and generated scripts, read and \
write files under the task's working directory, and install missing \
packages on import failure. It cannot reach the network unless a \
container network override is configured, cannot read files outside the \
working directory and the operator's home, and refuses any command that \
deletes a home or root directory, uses sudo, or formats a device.";

const PROJECT_PROMPT: &str = "\
Plan a change to the named project. Use only the project's registered \
commands; do not invent shell steps outside them. Consult the project's \
lessons-learned history before proposing an approach that has already \
failed.";

const FRONTEND_PROMPT: &str = "\
Plan a frontend code change: components, styling, and client-side logic. \
Prefer the smallest diff that satisfies the request.";

const UI_DESIGN_PROMPT: &str = "\
Plan a UI design artifact: a mockup, wireframe, or style description. \
Favor static output (HTML/CSS/SVG) the sandbox can render without a \
build step unless one is requested.";

const AUTOMATION_PROMPT: &str = "\
Plan an automation script: a one-off or scheduled task that performs a \
concrete side effect (file manipulation, an API call, a scheduled job). \
State the expected side effect explicitly so the Auditor can check it.";

const DATA_PROMPT: &str = "\
Plan a data analysis or transformation task. Prefer a single self-\
contained script over a notebook; print results instead of relying on \
a display backend.";

const FILE_PROMPT: &str = "\
Plan a file operation: reading, writing, converting, or organizing \
files under the working directory. State the exact output paths.";

const CODE_PROMPT: &str = "\
Plan a general code-generation task that does not fit a more specific \
category. Write a single runnable script that demonstrates the result.";

/// The system prompt for `task_type`, including the shared capabilities
/// block.
pub fn system_prompt(task_type: TaskType) -> String {
    let body = match task_type {
        TaskType::Project => PROJECT_PROMPT,
        TaskType::Frontend => FRONTEND_PROMPT,
        TaskType::UiDesign => UI_DESIGN_PROMPT,
        TaskType::Automation => AUTOMATION_PROMPT,
        TaskType::Data => DATA_PROMPT,
        TaskType::File => FILE_PROMPT,
        TaskType::Code => CODE_PROMPT,
    };
    format!("{body}\n\n{CAPABILITIES_BLOCK}")
}

#[cfg(test)]
#[path = "prompts_tests.rs"]
mod tests;
