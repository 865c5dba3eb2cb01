// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-method RPC handlers, dispatched by name from the connection loop.
//! Every handler is synchronous-looking (`async fn`) and returns a
//! [`Response`] directly — malformed params or a component error both
//! become `Response::err`, never a connection-closing panic.

use aether_core::{Clock, PoolMode, ToolCall};
use aether_wire::{method, AgentKillParams, AgentSpawnParams, AgentSpawnResult, AgentStatusParams,
    AgentStatusResult, EventsListParams, EventsListResult, LogsPathParams, LogsPathResult,
    PoolModeResult, Request, Response, SessionEventParams, StatusFullResult, StatusResult};
use tracing::{info, warn};

use super::ListenCtx;
use crate::error::DaemonError;

/// Events returned for `logs.path` / the `status.agent` tool-call window;
/// generous enough that truncation in practice only matters for `limit`.
const MAX_EVENTS_FOR_AGENT: usize = 10_000;

pub async fn dispatch<C: Clock + 'static>(ctx: &ListenCtx<C>, request: Request) -> Response {
    info!(method = %request.method, "handling rpc request");
    match request.method.as_str() {
        method::STATUS => status(ctx),
        method::STATUS_FULL => status_full(ctx),
        method::STATUS_AGENT => status_agent(ctx, request.params),
        method::POOL_DRAIN => set_mode(ctx, PoolMode::Draining),
        method::POOL_PAUSE => set_mode(ctx, PoolMode::Paused),
        method::POOL_RESUME => set_mode(ctx, PoolMode::Active),
        method::AGENT_KILL => agent_kill(ctx, request.params).await,
        method::AGENT_SPAWN => agent_spawn(ctx, request.params).await,
        method::LOGS_PATH => logs_path(ctx, request.params),
        method::EVENTS_LIST => events_list(ctx, request.params),
        method::SESSION_EVENT => session_event(ctx, request.params),
        method::SHUTDOWN => shutdown(ctx),
        other => Response::err(format!("unknown method {other:?}")),
    }
}

fn parse_params<T: serde::de::DeserializeOwned>(params: serde_json::Value) -> Result<T, Response> {
    serde_json::from_value(params).map_err(|e| Response::err(format!("invalid params: {e}")))
}

fn status<C: Clock + 'static>(ctx: &ListenCtx<C>) -> Response {
    let s = ctx.pool.status();
    let result = StatusResult { running: s.running, pool_size: s.pool_size, mode: s.mode, socket_path: ctx.socket_path.to_string_lossy().into_owned() };
    Response::ok(serde_json::to_value(result).expect("StatusResult always serializes"))
}

fn status_full<C: Clock + 'static>(ctx: &ListenCtx<C>) -> Response {
    let s = ctx.pool.status();
    let result = StatusFullResult {
        project: ctx.project.clone(),
        mode: s.mode,
        pool_size: s.pool_size,
        agents: s.agents,
        recent: ctx.pool.recent(),
        // The Poller admits directly against free capacity rather than
        // maintaining a persistent queue, so there is nothing to report
        // here; kept for wire compatibility with status consumers.
        queue_depth: 0,
        errors: Vec::new(),
    };
    Response::ok(serde_json::to_value(result).expect("StatusFullResult always serializes"))
}

fn status_agent<C: Clock + 'static>(ctx: &ListenCtx<C>, params: serde_json::Value) -> Response {
    let params: AgentStatusParams = match parse_params(params) {
        Ok(p) => p,
        Err(r) => return r,
    };
    let Some(agent) = ctx.pool.agent_status(&params.agent_id) else {
        return err_response(DaemonError::AgentNotFound(params.agent_id));
    };
    let tool_calls = match &agent.session_id {
        Some(session_id) => {
            let events = ctx.buffer.list(session_id, 0, MAX_EVENTS_FOR_AGENT).events;
            let mut calls = ToolCall::derive_from_events(&events.into_iter().map(|s| s.event).collect::<Vec<_>>());
            if calls.len() > params.limit {
                calls = calls.split_off(calls.len() - params.limit);
            }
            calls
        }
        None => Vec::new(),
    };
    let result = AgentStatusResult { agent, tool_calls };
    Response::ok(serde_json::to_value(result).expect("AgentStatusResult always serializes"))
}

fn set_mode<C: Clock + 'static>(ctx: &ListenCtx<C>, mode: PoolMode) -> Response {
    ctx.pool.set_mode(mode);
    let result = PoolModeResult { mode: ctx.pool.mode(), running: ctx.pool.running_count() };
    Response::ok(serde_json::to_value(result).expect("PoolModeResult always serializes"))
}

async fn agent_kill<C: Clock + 'static>(ctx: &ListenCtx<C>, params: serde_json::Value) -> Response {
    let params: AgentKillParams = match parse_params(params) {
        Ok(p) => p,
        Err(r) => return r,
    };
    match ctx.pool.kill(&params.agent_id).await {
        Ok(()) => Response::ok_empty(),
        Err(e) => err_response(e),
    }
}

async fn agent_spawn<C: Clock + 'static>(ctx: &ListenCtx<C>, params: serde_json::Value) -> Response {
    let params: AgentSpawnParams = match parse_params(params) {
        Ok(p) => p,
        Err(r) => return r,
    };
    match ctx.pool.spawn_freeform(&params.prompt, params.role).await {
        Ok(agent_id) => Response::ok(serde_json::to_value(AgentSpawnResult { agent_id }).expect("AgentSpawnResult always serializes")),
        Err(e) => err_response(e),
    }
}

fn logs_path<C: Clock + 'static>(ctx: &ListenCtx<C>, params: serde_json::Value) -> Response {
    let params: LogsPathParams = match parse_params(params) {
        Ok(p) => p,
        Err(r) => return r,
    };
    let Some(agent) = ctx.pool.agent_status(&params.agent_id) else {
        return err_response(DaemonError::AgentNotFound(params.agent_id));
    };
    let lines = match &agent.session_id {
        Some(session_id) => {
            ctx.buffer.list(session_id, 0, MAX_EVENTS_FOR_AGENT).events.iter().map(render_event_line).collect()
        }
        None => Vec::new(),
    };
    Response::ok(serde_json::to_value(LogsPathResult { lines }).expect("LogsPathResult always serializes"))
}

fn events_list<C: Clock + 'static>(ctx: &ListenCtx<C>, params: serde_json::Value) -> Response {
    let params: EventsListParams = match parse_params(params) {
        Ok(p) => p,
        Err(r) => return r,
    };
    let listed = ctx.buffer.list(&params.session_id, params.after_ms, params.limit);
    let result = EventsListResult { events: listed.events.into_iter().map(|s| s.event).collect(), dropped: listed.dropped };
    Response::ok(serde_json::to_value(result).expect("EventsListResult always serializes"))
}

fn session_event<C: Clock + 'static>(ctx: &ListenCtx<C>, params: serde_json::Value) -> Response {
    let params: SessionEventParams = match parse_params(params) {
        Ok(p) => p,
        Err(r) => return r,
    };
    let now_ms = ctx.clock.epoch_ms();
    match crate::ingest::ingest(&ctx.buffer, &ctx.pool, &ctx.registry, &ctx.project, params, now_ms) {
        Ok(()) => Response::ok_empty(),
        Err(e) => Response::err(e.to_string()),
    }
}

fn shutdown<C: Clock + 'static>(ctx: &ListenCtx<C>) -> Response {
    info!("rpc-initiated shutdown requested");
    ctx.shutdown.notify_one();
    Response::ok_empty()
}

fn err_response(e: DaemonError) -> Response {
    warn!(code = e.code(), error = %e, "rpc request failed");
    Response::err(e.to_terminal_string())
}

fn render_event_line(seq: &crate::event_buffer::Sequenced) -> String {
    let summary = seq
        .event
        .data
        .get("title")
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
        .unwrap_or_default();
    if summary.is_empty() {
        format!("[{}] {}", seq.event.timestamp_ms, seq.event.event_type)
    } else {
        format!("[{}] {} {}", seq.event.timestamp_ms, seq.event.event_type, summary)
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
