// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task tracker client. The kernel never owns task state; every query
//! and transition shells out to the external tracker binary (`prog` by
//! default) through the same [`CommandRunner`] seam the Reconciler uses
//! for `git`, so both share one fake-command-runner test harness.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use aether_core::{validate_task_id, Task, TaskStatus};
use serde::Deserialize;

use crate::process::CommandRunner;

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("tracker command failed with status {status}: {stderr}")]
    CommandFailed { status: i32, stderr: String },
    #[error("failed to parse tracker output: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("tracker I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    InvalidTaskId(#[from] aether_core::CoreError),
}

impl TrackerError {
    pub fn code(&self) -> &'static str {
        match self {
            TrackerError::CommandFailed { .. } => "tracker.command_failed",
            TrackerError::Parse(_) => "tracker.parse_failed",
            TrackerError::Io(_) => "io",
            TrackerError::InvalidTaskId(_) => "task.invalid_id",
        }
    }
}

#[derive(Debug, Deserialize)]
struct TaskRow {
    id: String,
    title: String,
    priority: i32,
    status: TaskStatus,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Task { id: row.id, title: row.title, priority: row.priority, status: row.status }
    }
}

pub struct Tracker {
    runner: Arc<dyn CommandRunner>,
    cmd: String,
    project_dir: PathBuf,
}

impl Tracker {
    pub fn new(runner: Arc<dyn CommandRunner>, cmd: impl Into<String>, project_dir: impl Into<PathBuf>) -> Self {
        Self { runner, cmd: cmd.into(), project_dir: project_dir.into() }
    }

    /// Tasks in `open` status, ready to be picked up by the Poller.
    pub async fn ready(&self, project: &str) -> Result<Vec<Task>, TrackerError> {
        self.list(project, "open").await
    }

    /// Tasks currently `in_progress`, used by `Pool::reclaim` at startup.
    pub async fn in_progress(&self, project: &str) -> Result<Vec<Task>, TrackerError> {
        self.list(project, "in_progress").await
    }

    /// Tasks `reviewing`, used by the Reconciler.
    pub async fn reviewing(&self, project: &str) -> Result<Vec<Task>, TrackerError> {
        self.list(project, "reviewing").await
    }

    async fn list(&self, project: &str, status: &str) -> Result<Vec<Task>, TrackerError> {
        let args = vec![
            "list".to_string(),
            "--project".to_string(),
            project.to_string(),
            "--status".to_string(),
            status.to_string(),
            "--json".to_string(),
        ];
        let output = self.run(&args).await?;
        let rows: Vec<TaskRow> = serde_json::from_str(&output)?;
        let mut tasks = Vec::with_capacity(rows.len());
        for row in rows {
            validate_task_id(&row.id)?;
            tasks.push(row.into());
        }
        Ok(tasks)
    }

    /// Transition `task_id` to `in_progress`, called before spawning.
    pub async fn mark_in_progress(&self, task_id: &str) -> Result<(), TrackerError> {
        validate_task_id(task_id)?;
        self.run(&["transition".into(), task_id.into(), "in_progress".into()]).await.map(drop)
    }

    /// Transition `task_id` to `done`, called by the Reconciler once its
    /// branch has merged.
    pub async fn mark_done(&self, task_id: &str) -> Result<(), TrackerError> {
        validate_task_id(task_id)?;
        self.run(&["transition".into(), task_id.into(), "done".into()]).await.map(drop)
    }

    /// Transition `task_id` to `blocked` with a human-readable reason,
    /// called when an agent's retries are exhausted.
    pub async fn mark_blocked(&self, task_id: &str, reason: &str) -> Result<(), TrackerError> {
        validate_task_id(task_id)?;
        self.run(&["transition".into(), task_id.into(), "blocked".into(), "--reason".into(), reason.into()])
            .await
            .map(drop)
    }

    /// Roll an `in_progress` transition back to `open`, used when a spawn
    /// fails after the tracker transition but before the process starts.
    pub async fn rollback_to_open(&self, task_id: &str) -> Result<(), TrackerError> {
        validate_task_id(task_id)?;
        self.run(&["transition".into(), task_id.into(), "open".into()]).await.map(drop)
    }

    async fn run(&self, args: &[String]) -> Result<String, TrackerError> {
        let output = self.runner.run(self.project_dir(), &self.cmd, args).await?;
        if !output.success() {
            return Err(TrackerError::CommandFailed { status: output.status, stderr: output.stderr });
        }
        Ok(output.stdout)
    }

    fn project_dir(&self) -> &Path {
        &self.project_dir
    }
}

#[cfg(test)]
#[path = "tracker_tests.rs"]
mod tests;
