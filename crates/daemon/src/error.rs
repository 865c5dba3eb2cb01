// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon-wide error type. Component-local errors (config, pool, tracker,
//! runtime client) convert into this via `#[from]` so the listener can
//! always produce a `Response::err` plus a structured `code` log field.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("agent {0:?} not found")]
    AgentNotFound(String),

    #[error("pool is at capacity ({running}/{size})")]
    PoolFull { running: usize, size: usize },

    #[error("pool is not active (mode = {0})")]
    PoolNotActive(String),

    #[error("session {0:?} already bound to agent {1:?}")]
    SessionConflict(String, String),

    #[error(transparent)]
    NameExhausted(#[from] aether_core::NameGeneratorError),

    #[error(transparent)]
    InvalidTaskId(#[from] aether_core::CoreError),

    #[error("task tracker command failed: {0}")]
    TrackerFailed(String),

    #[error("AI runtime is unhealthy: {0}")]
    RuntimeUnhealthy(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Wire(#[from] aether_wire::ProtocolError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl DaemonError {
    pub fn code(&self) -> &'static str {
        match self {
            DaemonError::AgentNotFound(_) => "agent.not_found",
            DaemonError::PoolFull { .. } => "pool.full",
            DaemonError::PoolNotActive(_) => "pool.not_active",
            DaemonError::SessionConflict(..) => "session.conflict",
            DaemonError::NameExhausted(_) => "name.exhausted",
            DaemonError::InvalidTaskId(_) => "task.invalid_id",
            DaemonError::TrackerFailed(_) => "tracker.failed",
            DaemonError::RuntimeUnhealthy(_) => "runtime.unhealthy",
            DaemonError::Config(_) => "config.invalid",
            DaemonError::Io(_) => "io",
            DaemonError::Wire(e) => e.code(),
            DaemonError::Internal(_) => "internal",
        }
    }

    /// Render as a client-safe message, stripped of control characters.
    pub fn to_terminal_string(&self) -> String {
        aether_core::sanitize_for_terminal(&self.to_string())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
