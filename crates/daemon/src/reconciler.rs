// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Interval check for completed work: tasks sitting in `reviewing` whose
//! branch has merged to the integration ref are transitioned to `done`.

use std::time::Duration;

use aether_core::validate_task_id;
use tracing::{debug, warn};

use crate::git::Git;
use crate::tracker::Tracker;

pub struct ReconcilerConfig {
    pub project: String,
    pub interval: Duration,
    pub remote: String,
    pub integration_ref: String,
    pub branch_prefix: String,
}

pub struct Reconciler {
    git: Git,
    tracker: Tracker,
    config: ReconcilerConfig,
}

impl Reconciler {
    pub fn new(git: Git, tracker: Tracker, config: ReconcilerConfig) -> Self {
        Self { git, tracker, config }
    }

    /// Run until `shutdown` resolves. One bad cycle (fetch failure,
    /// tracker outage) is logged and the loop continues.
    pub async fn run(&self, mut shutdown: tokio::sync::oneshot::Receiver<()>) {
        let mut ticker = tokio::time::interval(self.config.interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.tick().await {
                        warn!(error = %e, "reconciler tick failed");
                    }
                }
                _ = &mut shutdown => {
                    debug!("reconciler stopping");
                    return;
                }
            }
        }
    }

    /// One reconcile cycle. Returns the number of tasks transitioned to
    /// `done`.
    pub async fn tick(&self) -> Result<usize, crate::tracker::TrackerError> {
        if let Err(e) = self.git.fetch(&self.config.remote).await {
            debug!(error = %e, "reconciler fetch failed, degrading to local-only state");
        }

        let reviewing = self.tracker.reviewing(&self.config.project).await?;
        let mut merged_count = 0;
        for task in reviewing {
            if validate_task_id(&task.id).is_err() {
                warn!(task_id = %task.id, "reconciler skipping task with invalid id");
                continue;
            }
            let branch = format!("{}/{}", self.config.branch_prefix, task.id);
            match self.git.is_merged(&branch, &self.config.integration_ref).await {
                Ok(true) => {
                    debug!(task_id = %task.id, branch = %branch, "branch merged, marking task done");
                    self.tracker.mark_done(&task.id).await?;
                    merged_count += 1;
                }
                Ok(false) => {}
                Err(e) => warn!(task_id = %task.id, error = %e, "reconciler failed to check branch ancestry"),
            }
        }
        Ok(merged_count)
    }
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod tests;
