// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pool gating state.

use serde::{Deserialize, Serialize};

/// The pool's global gating state. `ShuttingDown` is reachable only from
/// the orchestrator's shutdown sequence and is terminal — no RPC drives
/// it and no RPC can leave it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolMode {
    Active,
    Draining,
    Paused,
    ShuttingDown,
}

impl PoolMode {
    pub fn allows_scheduling(self) -> bool {
        matches!(self, PoolMode::Active)
    }

    pub fn allows_respawn(self) -> bool {
        matches!(self, PoolMode::Active | PoolMode::Draining)
    }
}

impl std::fmt::Display for PoolMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PoolMode::Active => "active",
            PoolMode::Draining => "draining",
            PoolMode::Paused => "paused",
            PoolMode::ShuttingDown => "shutting_down",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
#[path = "pool_mode_tests.rs"]
mod tests;
