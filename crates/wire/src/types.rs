// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed params/result shapes for individual RPC methods, carried inside
//! the untyped [`crate::Request::params`] / [`crate::Response::result`]
//! envelope fields as `serde_json::Value`.

use aether_core::{Agent, Event, PoolMode, RecentAgent, Role, ToolCall};
use serde::{Deserialize, Serialize};

/// Result of `status`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusResult {
    pub running: usize,
    pub pool_size: usize,
    pub mode: PoolMode,
    pub socket_path: String,
}

/// Result of `status.full`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusFullResult {
    pub project: String,
    pub mode: PoolMode,
    pub pool_size: usize,
    pub agents: Vec<Agent>,
    pub recent: Vec<RecentAgent>,
    pub queue_depth: usize,
    #[serde(default)]
    pub errors: Vec<String>,
}

/// Params for `status.agent`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentStatusParams {
    pub agent_id: String,
    #[serde(default = "default_tool_call_limit")]
    pub limit: usize,
}

fn default_tool_call_limit() -> usize {
    50
}

/// Result of `status.agent`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentStatusResult {
    pub agent: Agent,
    pub tool_calls: Vec<ToolCall>,
}

/// Result of `pool.drain` / `pool.pause` / `pool.resume`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PoolModeResult {
    pub mode: PoolMode,
    pub running: usize,
}

/// Params for `agent.kill`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentKillParams {
    pub agent_id: String,
}

/// Params for `agent.spawn`: a freeform prompt with no tracker-backed
/// task, as issued by `af spawn`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentSpawnParams {
    pub prompt: String,
    #[serde(default)]
    pub role: Role,
}

/// Result of `agent.spawn`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentSpawnResult {
    pub agent_id: String,
}

/// Params for `logs.path`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogsPathParams {
    pub agent_id: String,
}

/// Result of `logs.path`: buffered events rendered as one-line-per-event
/// text, suitable for direct terminal output by `af logs`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogsPathResult {
    pub lines: Vec<String>,
}

/// Params for `events.list`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventsListParams {
    pub session_id: String,
    #[serde(default)]
    pub after_ms: u64,
    #[serde(default = "default_events_limit")]
    pub limit: usize,
}

fn default_events_limit() -> usize {
    500
}

/// Result of `events.list`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventsListResult {
    pub events: Vec<Event>,
    /// Number of events dropped from the ring before the oldest returned
    /// entry, so callers can detect a gap.
    pub dropped: u64,
}

/// Params for `session.event`, the plugin's push endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionEventParams {
    #[serde(default)]
    pub agent_id: Option<String>,
    pub event_type: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<u64>,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
