// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Embedded prompt templates, rendered by role.
//!
//! The `Task: <id>` line is a cross-boundary string contract: the
//! embedded plugin parses it back out of the runtime's own prompt-echo
//! with a regex. Any change to this literal must be made in lockstep
//! with the plugin.

use aether_core::Role;

const WORKER_TEMPLATE: &str = "Task: {task_id}\n\n{title}\n\nWork this task to completion, then open a pull request.";

const PLANNER_TEMPLATE: &str =
    "Task: {task_id}\n\n{title}\n\nBreak this task down into an implementation plan before making changes.";

/// Render the prompt for `role` against `task_id`/`title`.
pub fn render(role: Role, task_id: &str, title: &str) -> String {
    let template = match role {
        Role::Worker => WORKER_TEMPLATE,
        Role::Planner => PLANNER_TEMPLATE,
    };
    template.replace("{task_id}", task_id).replace("{title}", title)
}

/// Render a freeform (`af spawn`) prompt with no tracker-backed task.
pub fn render_freeform(prompt: &str) -> String {
    prompt.to_string()
}

#[cfg(test)]
#[path = "prompt_tests.rs"]
mod tests;
