// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Derived view over a matched `tool.execute.before`/`after` event pair.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::event::{event_type, Event};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCallStatus {
    InProgress,
    Ok,
    Err,
}

impl std::fmt::Display for ToolCallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ToolCallStatus::InProgress => "in_progress",
            ToolCallStatus::Ok => "ok",
            ToolCallStatus::Err => "err",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub timestamp_ms: u64,
    pub tool: String,
    pub title: String,
    /// Canonicalized summary of the primary argument (e.g. `filePath` for
    /// read/edit/write, `pattern` for glob/grep, `command` for shell),
    /// truncated for display.
    pub input: String,
    pub status: ToolCallStatus,
    pub duration_ms: Option<u64>,
}

struct Pending {
    started_ms: u64,
    tool: String,
    title: String,
    input: String,
}

impl ToolCall {
    /// Reconstruct tool-call history by pairing `tool.execute.before` with
    /// the matching `tool.execute.after` event on `callID`, in timestamp
    /// order. A `before` with no matching `after` is reported in progress.
    pub fn derive_from_events(events: &[Event]) -> Vec<ToolCall> {
        let mut pending: HashMap<String, Pending> = HashMap::new();
        let mut calls = Vec::new();

        for event in events {
            let Some(call_id) = event.data.get("callID").and_then(Value::as_str) else {
                continue;
            };
            match event.event_type.as_str() {
                event_type::TOOL_EXECUTE_BEFORE => {
                    let tool = event.data.get("tool").and_then(Value::as_str).unwrap_or("unknown").to_string();
                    let title = event.data.get("title").and_then(Value::as_str).unwrap_or(&tool).to_string();
                    let input = summarize_input(&event.data);
                    pending.insert(call_id.to_string(), Pending { started_ms: event.timestamp_ms, tool, title, input });
                }
                event_type::TOOL_EXECUTE_AFTER => {
                    if let Some(p) = pending.remove(call_id) {
                        let status = if event.data.get("error").is_some_and(|v| !v.is_null()) {
                            ToolCallStatus::Err
                        } else {
                            ToolCallStatus::Ok
                        };
                        calls.push(ToolCall {
                            timestamp_ms: p.started_ms,
                            tool: p.tool,
                            title: p.title,
                            input: p.input,
                            status,
                            duration_ms: Some(event.timestamp_ms.saturating_sub(p.started_ms)),
                        });
                    }
                }
                _ => {}
            }
        }

        for p in pending.into_values() {
            calls.push(ToolCall {
                timestamp_ms: p.started_ms,
                tool: p.tool,
                title: p.title,
                input: p.input,
                status: ToolCallStatus::InProgress,
                duration_ms: None,
            });
        }

        calls.sort_by_key(|c| c.timestamp_ms);
        calls
    }
}

const MAX_INPUT_DISPLAY_CHARS: usize = 120;

/// Fields already surfaced elsewhere on [`ToolCall`] (or pure plumbing),
/// skipped when falling back to "the first string field".
const NON_ARGUMENT_FIELDS: [&str; 3] = ["callID", "tool", "title"];

fn summarize_input(data: &Value) -> String {
    for key in ["filePath", "pattern", "command", "query", "path"] {
        if let Some(s) = data.get(key).and_then(Value::as_str) {
            return truncate(s);
        }
    }
    // None of the named keys matched (a tool this kernel doesn't special-case);
    // fall back to the first remaining string-valued field so the call isn't
    // shown blank.
    data.as_object()
        .and_then(|obj| {
            obj.iter().filter(|(k, _)| !NON_ARGUMENT_FIELDS.contains(&k.as_str())).find_map(|(_, v)| v.as_str())
        })
        .map(truncate)
        .unwrap_or_default()
}

fn truncate(s: &str) -> String {
    if s.chars().count() <= MAX_INPUT_DISPLAY_CHARS {
        s.to_string()
    } else {
        s.chars().take(MAX_INPUT_DISPLAY_CHARS).collect::<String>() + "…"
    }
}

#[cfg(test)]
#[path = "tool_call_tests.rs"]
mod tests;
