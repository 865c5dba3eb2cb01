// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Interval admission loop: asks the tracker for ready tasks and spawns
//! them into the Pool under capacity and mode constraints.

use std::sync::Arc;
use std::time::Duration;

use aether_core::{validate_task_id, Clock, PoolMode, Task};
use tracing::{debug, warn};

use crate::pool::Pool;
use crate::tracker::Tracker;

pub struct PollerConfig {
    pub project: String,
    pub interval: Duration,
}

pub struct Poller<C: Clock> {
    pool: Arc<Pool<C>>,
    tracker: Arc<Tracker>,
    config: PollerConfig,
}

impl<C: Clock + 'static> Poller<C> {
    pub fn new(pool: Arc<Pool<C>>, tracker: Arc<Tracker>, config: PollerConfig) -> Self {
        Self { pool, tracker, config }
    }

    /// Run the admission loop until `shutdown` resolves. Each tick calls
    /// [`Poller::tick`] and swallows its result — a single bad cycle (a
    /// tracker outage, a transient spawn failure) must not kill the loop.
    pub async fn run(&self, mut shutdown: tokio::sync::oneshot::Receiver<()>) {
        let mut ticker = tokio::time::interval(self.config.interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.tick().await {
                        warn!(error = %e, "poller tick failed");
                    }
                }
                _ = &mut shutdown => {
                    debug!("poller stopping");
                    return;
                }
            }
        }
    }

    /// One admission cycle: fetch ready tasks, admit up to free capacity.
    pub async fn tick(&self) -> Result<usize, crate::tracker::TrackerError> {
        if self.pool.mode() != PoolMode::Active {
            debug!(mode = ?self.pool.mode(), "poller skipping tick, pool not active");
            return Ok(0);
        }

        let ready = self.tracker.ready(&self.config.project).await?;
        let free_slots = self.free_slots();
        if free_slots == 0 {
            return Ok(0);
        }

        let mut candidates: Vec<Task> = ready
            .into_iter()
            .filter(|t| {
                if validate_task_id(&t.id).is_err() {
                    warn!(task_id = %t.id, "poller skipping task with invalid id");
                    return false;
                }
                if self.pool.agent_status(&t.id).is_some() {
                    return false;
                }
                true
            })
            .collect();
        candidates.sort_by_key(|t| t.priority);

        let mut spawned = 0;
        for task in candidates.into_iter().take(free_slots) {
            match self.pool.spawn(&task).await {
                Ok(name) => {
                    debug!(task_id = %task.id, agent = %name, "poller admitted task");
                    spawned += 1;
                }
                Err(e) => warn!(task_id = %task.id, error = %e, "poller failed to spawn task"),
            }
        }
        Ok(spawned)
    }

    fn free_slots(&self) -> usize {
        self.pool.status().pool_size.saturating_sub(self.pool.running_count())
    }
}

#[cfg(test)]
#[path = "poller_tests.rs"]
mod tests;
