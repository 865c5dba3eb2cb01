// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime event envelope pushed by the in-process plugin.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One event as pushed by the plugin (or backfilled from the runtime's
/// REST API). `event_type` is drawn from the runtime's own taxonomy and
/// is treated as an opaque string here — the kernel does not need a
/// closed enum since new event types must pass through unmodified to the
/// buffer and formatter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub session_id: String,
    pub event_type: String,
    pub timestamp_ms: u64,
    #[serde(default)]
    pub data: Value,
}

/// Known event-type constants. Not exhaustive — the buffer and ingest
/// path must accept any `event_type` string, these are just the ones the
/// kernel's own logic branches on.
pub mod event_type {
    pub const SESSION_CREATED: &str = "session.created";
    pub const SESSION_IDLE: &str = "session.idle";
    pub const SESSION_ERROR: &str = "session.error";
    pub const SESSION_COMPACTED: &str = "session.compacted";
    pub const SESSION_STATUS: &str = "session.status";
    pub const MESSAGE_UPDATED: &str = "message.updated";
    pub const MESSAGE_PART_UPDATED: &str = "message.part.updated";
    pub const TOOL_EXECUTE_BEFORE: &str = "tool.execute.before";
    pub const TOOL_EXECUTE_AFTER: &str = "tool.execute.after";
}

impl Event {
    /// A session is considered terminated for `follow()` purposes once it
    /// emits `session.idle` or `session.error`.
    pub fn terminates_follow(&self) -> bool {
        matches!(self.event_type.as_str(), event_type::SESSION_IDLE | event_type::SESSION_ERROR)
    }

    /// Extract `session_id` from a raw plugin payload following the
    /// precedence `data.sessionID` > `data.info.id` > `data.info.sessionID`
    /// > `data.part.sessionID`.
    pub fn extract_session_id(data: &Value) -> Option<String> {
        data.get("sessionID")
            .and_then(Value::as_str)
            .or_else(|| data.get("info").and_then(|i| i.get("id")).and_then(Value::as_str))
            .or_else(|| {
                data.get("info").and_then(|i| i.get("sessionID")).and_then(Value::as_str)
            })
            .or_else(|| data.get("part").and_then(|p| p.get("sessionID")).and_then(Value::as_str))
            .map(str::to_string)
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
