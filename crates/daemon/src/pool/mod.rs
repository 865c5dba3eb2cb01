// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Agent Pool: spawns and reaps agent subprocesses, gated by a
//! totally-ordered mode, with crash respawn and a fixed-capacity
//! recent-exits ring for operator visibility.

pub mod prompt;

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::Arc;

use aether_core::{Agent, AgentState, Clock, ExitState, NameGenerator, PoolMode, RecentAgent, Role, Task};
use parking_lot::RwLock;
use tracing::{debug, error, info, warn};

use crate::error::DaemonError;
use crate::process::{ProcessHandle, ProcessStarter};
use crate::tracker::Tracker;

const RECENT_CAPACITY: usize = 20;

pub struct PoolConfig {
    pub pool_size: usize,
    pub spawn_cmd: String,
    pub runtime_url: String,
    pub project_dir: PathBuf,
    pub max_retries: u32,
}

struct PoolState {
    agents: HashMap<String, Agent>,
    /// Task titles remembered across a spawn so a crash respawn can
    /// re-render the prompt without re-querying the tracker.
    titles: HashMap<String, String>,
    recent: VecDeque<RecentAgent>,
    mode: PoolMode,
}

/// A snapshot of the pool for RPC status responses.
#[derive(Debug, Clone)]
pub struct PoolStatus {
    pub mode: PoolMode,
    pub running: usize,
    pub pool_size: usize,
    pub agents: Vec<Agent>,
}

pub struct Pool<C: Clock> {
    state: RwLock<PoolState>,
    names: NameGenerator,
    starter: Arc<dyn ProcessStarter>,
    tracker: Arc<Tracker>,
    config: PoolConfig,
    clock: C,
    env: Box<dyn Fn(&str) -> Vec<(String, String)> + Send + Sync>,
}

impl<C: Clock + 'static> Pool<C> {
    pub fn new(
        config: PoolConfig,
        starter: Arc<dyn ProcessStarter>,
        tracker: Arc<Tracker>,
        clock: C,
        env: impl Fn(&str) -> Vec<(String, String)> + Send + Sync + 'static,
    ) -> Self {
        Self {
            state: RwLock::new(PoolState {
                agents: HashMap::new(),
                titles: HashMap::new(),
                recent: VecDeque::with_capacity(RECENT_CAPACITY),
                mode: PoolMode::Active,
            }),
            names: NameGenerator::new(),
            starter,
            tracker,
            config,
            clock,
            env: Box::new(env),
        }
    }

    pub fn mode(&self) -> PoolMode {
        self.state.read().mode
    }

    pub fn running_count(&self) -> usize {
        self.state.read().agents.len()
    }

    pub fn status(&self) -> PoolStatus {
        let state = self.state.read();
        PoolStatus {
            mode: state.mode,
            running: state.agents.len(),
            pool_size: self.config.pool_size,
            agents: state.agents.values().cloned().collect(),
        }
    }

    pub fn agent_status(&self, name: &str) -> Option<Agent> {
        self.state.read().agents.get(name).cloned()
    }

    /// The title/prompt text remembered for `key` at spawn time, if any —
    /// used by the session registry for its `prompt_snippet` field.
    pub fn title_for(&self, key: &str) -> Option<String> {
        self.state.read().titles.get(key).cloned()
    }

    /// Base URL of the runtime subprocess this pool's agents attach to.
    pub fn runtime_url(&self) -> &str {
        &self.config.runtime_url
    }

    pub fn recent(&self) -> Vec<RecentAgent> {
        self.state.read().recent.iter().cloned().collect()
    }

    /// Totally ordered: logs `from`/`to`, gates future `spawn`/`respawn`
    /// calls. No other side effects — pool contents are untouched.
    pub fn set_mode(self: &Arc<Self>, new_mode: PoolMode) {
        let old = {
            let mut state = self.state.write();
            let old = state.mode;
            state.mode = new_mode;
            old
        };
        info!(from = %old, to = %new_mode, "pool mode transition");
    }

    /// Write-once session claim; a conflicting late claim is logged and
    /// ignored rather than erroring the caller.
    pub fn claim_session(&self, agent_id: &str, session_id: &str) {
        let mut state = self.state.write();
        match state.agents.get_mut(agent_id) {
            Some(agent) => {
                if !agent.claim_session(session_id.to_string()) {
                    warn!(
                        agent_id,
                        session_id,
                        existing = ?agent.session_id,
                        "ignoring conflicting late session claim"
                    );
                }
            }
            None => debug!(agent_id, session_id, "claim_session for unknown agent"),
        }
    }

    /// Spawn a new agent for `task`, transitioning the tracker to
    /// `in_progress` before starting the process.
    pub async fn spawn(self: &Arc<Self>, task: &Task) -> Result<String, DaemonError> {
        {
            let state = self.state.read();
            if !state.mode.allows_scheduling() {
                return Err(DaemonError::PoolNotActive(state.mode.to_string()));
            }
            if state.agents.len() >= self.config.pool_size {
                return Err(DaemonError::PoolFull { running: state.agents.len(), size: self.config.pool_size });
            }
            if state.agents.contains_key(&task.id) {
                return Err(DaemonError::Internal(format!("task {} already has a running agent", task.id)));
            }
        }

        self.tracker.mark_in_progress(&task.id).await.map_err(|e| DaemonError::TrackerFailed(e.to_string()))?;

        let rendered = prompt::render(Role::Worker, &task.id, &task.title);
        let result = self
            .start_agent(Some(task.id.clone()), task.id.clone(), Role::Worker, rendered, &task.title, self.config.max_retries)
            .await;
        match result {
            Ok(name) => Ok(name),
            Err(e) => {
                if let Err(rollback_err) = self.tracker.rollback_to_open(&task.id).await {
                    error!(task_id = %task.id, error = %rollback_err, "failed to roll back tracker transition; marking for reclaim");
                } else {
                    warn!(task_id = %task.id, error = %e, "spawn failed after tracker transition, rolled back to open");
                }
                Err(e)
            }
        }
    }

    /// Respawn `task_id` (crash recovery or orphan reclaim): skips the
    /// tracker transition since the task is already `in_progress`. Retry
    /// budget resets to the configured maximum, since a reclaim has no
    /// memory of how many attempts preceded the daemon restart.
    pub async fn respawn(self: &Arc<Self>, task_id: &str, title: &str, role: Role) -> Result<String, DaemonError> {
        self.respawn_with_retries(task_id, title, role, self.config.max_retries).await
    }

    async fn respawn_with_retries(
        self: &Arc<Self>,
        task_id: &str,
        title: &str,
        role: Role,
        retries_remaining: u32,
    ) -> Result<String, DaemonError> {
        {
            let state = self.state.read();
            if !state.mode.allows_respawn() {
                return Err(DaemonError::PoolNotActive(state.mode.to_string()));
            }
            if state.agents.len() >= self.config.pool_size {
                return Err(DaemonError::PoolFull { running: state.agents.len(), size: self.config.pool_size });
            }
            if state.agents.contains_key(task_id) {
                return Err(DaemonError::Internal(format!("task {task_id} already has a running agent")));
            }
        }
        let rendered = prompt::render(role, task_id, title);
        self.start_agent(Some(task_id.to_string()), task_id.to_string(), role, rendered, title, retries_remaining).await
    }

    /// Spawn a freeform agent with no tracker-backed task (`af spawn`).
    /// Keyed by its own generated name since there is no task id to key
    /// on; a freeform agent that crashes is not retried, matching
    /// `reap`'s empty-`task_id` early return.
    pub async fn spawn_freeform(self: &Arc<Self>, prompt_text: &str, role: Role) -> Result<String, DaemonError> {
        {
            let state = self.state.read();
            if !state.mode.allows_scheduling() {
                return Err(DaemonError::PoolNotActive(state.mode.to_string()));
            }
            if state.agents.len() >= self.config.pool_size {
                return Err(DaemonError::PoolFull { running: state.agents.len(), size: self.config.pool_size });
            }
        }
        let rendered = prompt::render_freeform(prompt_text);
        self.start_agent(None, String::new(), role, rendered, prompt_text, 0).await
    }

    async fn start_agent(
        self: &Arc<Self>,
        key: Option<String>,
        task_id: String,
        role: Role,
        rendered_prompt: String,
        title: &str,
        retries_remaining: u32,
    ) -> Result<String, DaemonError> {
        let name = self.names.generate()?;
        let key = key.unwrap_or_else(|| name.clone());
        let args = vec!["--attach".to_string(), self.config.runtime_url.clone(), rendered_prompt];
        let extra_env = (self.env)(&name);

        let handle = match self.starter.start(&self.config.project_dir, &self.config.spawn_cmd, &args, &extra_env).await {
            Ok(handle) => handle,
            Err(e) => {
                self.names.release(&name);
                return Err(DaemonError::Io(e));
            }
        };

        let pid = handle.pid();
        let mut agent = Agent::new(name.clone(), task_id.clone(), role, pid, self.clock.epoch_ms(), retries_remaining);
        agent.mark_running();
        {
            let mut state = self.state.write();
            state.agents.insert(key.clone(), agent);
            state.titles.insert(key.clone(), title.to_string());
        }

        info!(agent = %name, task_id = %task_id, pid, "agent spawned");
        self.spawn_reaper(key, name.clone(), handle);
        Ok(name)
    }

    /// Launches the background task that awaits subprocess exit,
    /// classifies it, and drives respawn/ring-buffer bookkeeping.
    fn spawn_reaper(self: &Arc<Self>, key: String, name: String, mut handle: Box<dyn ProcessHandle>) {
        let pool = Arc::clone(self);
        tokio::spawn(async move {
            let exit = handle.wait().await;
            pool.reap(&key, &name, exit).await;
        });
    }

    async fn reap(self: &Arc<Self>, key: &str, name: &str, exit: std::io::Result<std::process::ExitStatus>) {
        let exit_time_ms = self.clock.epoch_ms();
        let (exit_state, exit_code, task_id, role, retries_remaining, title) = {
            let mut state = self.state.write();
            let Some(mut agent) = state.agents.remove(key) else {
                warn!(agent = %name, "reap called for an agent no longer in the pool");
                return;
            };
            let (exit_state, exit_code) = match &exit {
                Ok(status) if status.success() => (ExitState::Clean, status.code()),
                Ok(status) => (ExitState::Crashed, status.code()),
                Err(e) => {
                    error!(agent = %name, error = %e, "failed to wait on agent subprocess");
                    (ExitState::Crashed, None)
                }
            };
            agent.state = AgentState::Exited;
            agent.exit_state = Some(exit_state);
            agent.exit_code = exit_code;
            let retries_remaining = agent.retries_remaining;
            let task_id = agent.task_id.clone();
            let role = agent.role;
            let title = state.titles.get(key).cloned().unwrap_or_default();

            if state.recent.len() >= RECENT_CAPACITY {
                state.recent.pop_front();
            }
            state.recent.push_back(agent.into_recent(exit_time_ms));

            (exit_state, exit_code, task_id, role, retries_remaining, title)
        };
        self.names.release(name);

        info!(agent = %name, task_id = %task_id, ?exit_state, exit_code, "agent reaped");

        if exit_state != ExitState::Crashed || task_id.is_empty() {
            self.state.write().titles.remove(key);
            return;
        }

        let mode = self.mode();
        if mode == PoolMode::Paused {
            debug!(task_id = %task_id, "pool paused, not respawning crashed agent");
            return;
        }
        if retries_remaining == 0 {
            warn!(task_id = %task_id, "retries exhausted, marking task blocked");
            self.state.write().titles.remove(key);
            if let Err(e) = self.tracker.mark_blocked(&task_id, "agent crashed and retries were exhausted").await {
                error!(task_id = %task_id, error = %e, "failed to mark task blocked");
            }
            return;
        }

        let pool = Arc::clone(self);
        let task_id_for_respawn = task_id.clone();
        let remaining = retries_remaining - 1;
        tokio::spawn(async move {
            match pool.respawn_with_retries(&task_id_for_respawn, &title, role, remaining).await {
                Ok(name) => info!(agent = %name, task_id = %task_id_for_respawn, remaining, "respawned after crash"),
                Err(e) => error!(task_id = %task_id_for_respawn, error = %e, "respawn after crash failed"),
            }
        });
    }

    /// Validate the agent exists and is running, then signal it.
    /// Signal delivery never happens while holding the pool lock.
    pub async fn kill(&self, name: &str) -> Result<(), DaemonError> {
        let pid = {
            let state = self.state.read();
            match state.agents.get(name) {
                Some(agent) if agent.state == AgentState::Running => agent.pid,
                Some(_) => return Err(DaemonError::AgentNotFound(name.to_string())),
                None => return Err(DaemonError::AgentNotFound(name.to_string())),
            }
        };
        match nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid as i32), nix::sys::signal::Signal::SIGTERM) {
            Ok(()) => Ok(()),
            Err(nix::errno::Errno::ESRCH) => {
                debug!(agent = name, pid, "kill: process already exited");
                Ok(())
            }
            Err(e) => Err(DaemonError::Io(std::io::Error::from_raw_os_error(e as i32))),
        }
    }

    /// Once at startup: respawn every `in_progress` task not already
    /// running, up to capacity. Overflow is left to normal polling.
    pub async fn reclaim(self: &Arc<Self>, in_progress: Vec<Task>) -> usize {
        if self.mode() == PoolMode::Paused {
            return 0;
        }
        let mut reclaimed = 0;
        for task in in_progress {
            if self.running_count() >= self.config.pool_size {
                debug!("reclaim stopped: pool at capacity");
                break;
            }
            if self.state.read().agents.contains_key(&task.id) {
                continue;
            }
            match self.respawn(&task.id, &task.title, Role::Worker).await {
                Ok(name) => {
                    info!(agent = %name, task_id = %task.id, "reclaimed orphaned task");
                    reclaimed += 1;
                }
                Err(e) => error!(task_id = %task.id, error = %e, "failed to reclaim orphaned task"),
            }
        }
        reclaimed
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
