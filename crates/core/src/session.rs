// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session registry record types.
//!
//! A session is an AI-runtime conversation identified by an opaque
//! `ses_…` string. The kernel's registry is a routing index only — the
//! runtime remains the source of truth for conversation content.

use serde::{Deserialize, Serialize};

/// How a session came to be tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOrigin {
    /// Spawned by the Poller/Pool against a tracker task.
    Pool,
    /// Spawned via `af spawn` (freeform, no task).
    Spawn,
    /// Discovered via backfill from the runtime's session list, never
    /// observed through a live `spawn`/`respawn`.
    Manual,
}

impl std::fmt::Display for SessionOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SessionOrigin::Pool => "pool",
            SessionOrigin::Spawn => "spawn",
            SessionOrigin::Manual => "manual",
        };
        write!(f, "{s}")
    }
}

/// One entry in the persistent session registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: String,
    pub agent_id: String,
    pub task_id: String,
    pub project: String,
    pub server_url: String,
    pub origin: SessionOrigin,
    pub created_at_ms: u64,
    pub last_seen_at_ms: u64,
    /// First ~120 chars of the agent's initial prompt, for operator recall.
    pub prompt_snippet: String,
}

impl SessionRecord {
    pub fn touch(&mut self, now_ms: u64) {
        self.last_seen_at_ms = now_ms;
    }

    pub fn is_idle(&self, now_ms: u64, ttl_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_seen_at_ms) >= ttl_ms
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
