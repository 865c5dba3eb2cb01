// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent identity, lifecycle state, and the recent-exits ring entry.
//!
//! An Agent is a managed subprocess representing one unit of automated
//! work. Its `session_id` is write-once: learned lazily from the first
//! `session.created` event that names it, sticking after that.

use serde::{Deserialize, Serialize};

/// The role an agent was spawned with. The Poller currently only ever
/// selects `Worker` — the data model carries `Planner` as a hook for
/// future role inference, per the open question in the design notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Worker,
    Planner,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::Worker => "worker",
            Role::Planner => "planner",
        };
        write!(f, "{s}")
    }
}

/// Lifecycle state of a live (not-yet-reaped) agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentState {
    Spawning,
    Running,
    Exited,
}

impl std::fmt::Display for AgentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AgentState::Spawning => "spawning",
            AgentState::Running => "running",
            AgentState::Exited => "exited",
        };
        write!(f, "{s}")
    }
}

/// How an agent's process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitState {
    Clean,
    Crashed,
    Killed,
}

impl std::fmt::Display for ExitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ExitState::Clean => "clean",
            ExitState::Crashed => "crashed",
            ExitState::Killed => "killed",
        };
        write!(f, "{s}")
    }
}

/// A live agent tracked by the pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    /// Empty for freeform (`af spawn`) invocations.
    pub task_id: String,
    pub role: Role,
    pub pid: u32,
    pub spawn_time_ms: u64,
    pub state: AgentState,
    pub retries_remaining: u32,
    pub exit_state: Option<ExitState>,
    pub exit_code: Option<i32>,
    /// Write-once: the first value set sticks, see [`Agent::claim_session`].
    pub session_id: Option<String>,
}

impl Agent {
    pub fn new(id: String, task_id: String, role: Role, pid: u32, spawn_time_ms: u64, max_retries: u32) -> Self {
        Self {
            id,
            task_id,
            role,
            pid,
            spawn_time_ms,
            state: AgentState::Spawning,
            retries_remaining: max_retries,
            exit_state: None,
            exit_code: None,
            session_id: None,
        }
    }

    /// Write-once session claim. Returns `true` if the claim took effect,
    /// `false` if a session was already bound (conflict — caller logs).
    pub fn claim_session(&mut self, session_id: String) -> bool {
        if self.session_id.is_some() {
            false
        } else {
            self.session_id = Some(session_id);
            true
        }
    }

    pub fn mark_running(&mut self) {
        self.state = AgentState::Running;
    }

    pub fn into_recent(self, exit_time_ms: u64) -> RecentAgent {
        RecentAgent {
            id: self.id,
            task_id: self.task_id,
            role: self.role,
            spawn_time_ms: self.spawn_time_ms,
            exit_time_ms,
            exit_state: self.exit_state.unwrap_or(ExitState::Crashed),
            exit_code: self.exit_code,
            duration_ms: exit_time_ms.saturating_sub(self.spawn_time_ms),
        }
    }
}

/// Immutable snapshot of an exited agent kept in the fixed-capacity
/// recent-exits ring for operator visibility. Never mutated after
/// insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentAgent {
    pub id: String,
    pub task_id: String,
    pub role: Role,
    pub spawn_time_ms: u64,
    pub exit_time_ms: u64,
    pub exit_state: ExitState,
    pub exit_code: Option<i32>,
    pub duration_ms: u64,
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
