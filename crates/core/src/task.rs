// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task reference types.
//!
//! A Task mirrors an entity owned by the external tracker (`prog`). The
//! kernel never owns a Task; it only observes and transitions it via
//! tracker subcommands.

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use regex::Regex;

/// Task ids must match this pattern before they are ever passed as a
/// process argument to `prog` or used to build a branch name — this
/// defends against tracker output smuggling command-line flags.
pub const TASK_ID_PATTERN: &str = r"^[A-Za-z0-9][A-Za-z0-9._-]*$";

fn task_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(TASK_ID_PATTERN).expect("valid static regex"))
}

/// Validate a task id against [`TASK_ID_PATTERN`].
pub fn validate_task_id(id: &str) -> Result<(), crate::CoreError> {
    if task_id_regex().is_match(id) {
        Ok(())
    } else {
        Err(crate::CoreError::InvalidTaskId(id.to_string(), TASK_ID_PATTERN))
    }
}

/// Project names share [`TASK_ID_PATTERN`]: both are embedded in file
/// paths (socket/PID files, branch names) and must defend against path
/// traversal and flag injection the same way.
pub fn project_name_regex() -> &'static Regex {
    task_id_regex()
}

/// Validate a project name against [`TASK_ID_PATTERN`].
pub fn validate_project_name(name: &str) -> Result<(), crate::CoreError> {
    if project_name_regex().is_match(name) {
        Ok(())
    } else {
        Err(crate::CoreError::InvalidProjectName(name.to_string(), TASK_ID_PATTERN))
    }
}

/// Lifecycle status of a task as reported by the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Open,
    InProgress,
    Reviewing,
    Done,
    Blocked,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TaskStatus::Open => "open",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Reviewing => "reviewing",
            TaskStatus::Done => "done",
            TaskStatus::Blocked => "blocked",
        };
        write!(f, "{s}")
    }
}

/// A task as observed from the tracker. The subset of fields the kernel
/// actually consumes (full records also carry assignee, description, etc.,
/// which are CLI/TUI concerns and out of scope here).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    /// Lower value sorts first; ties break on arrival order.
    pub priority: i32,
    pub status: TaskStatus,
}

impl Task {
    pub fn validate(&self) -> Result<(), crate::CoreError> {
        validate_task_id(&self.id)
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
