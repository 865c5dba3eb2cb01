// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Handles `session.event` RPCs pushed fire-and-forget by the embedded
//! plugin. Validates the payload, appends to the Event Buffer, and on
//! `session.created` correlates the session to an agent.

use aether_core::{event::event_type, Clock, Event, SessionOrigin, SessionRecord};
use aether_wire::SessionEventParams;
use tracing::warn;

use crate::event_buffer::EventBuffer;
use crate::pool::Pool;
use crate::session_registry::SessionRegistry;

const PROMPT_SNIPPET_CHARS: usize = 120;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("event payload is missing a session id")]
    MissingSessionId,
}

impl IngestError {
    pub fn code(&self) -> &'static str {
        match self {
            IngestError::MissingSessionId => "ingest.missing_session_id",
        }
    }
}

/// Validate and append one event, correlating `session.created` events
/// to the agent named by `agent_id` in the payload (carried by the
/// `AETHERFLOW_AGENT_ID` env var the Pool injected into the agent's
/// process, echoed back by the plugin). Unknown session ids are still
/// buffered — they may belong to sessions the runtime client later
/// backfills.
///
/// `session.created` also inserts a persistent [`SessionRecord`] into
/// `registry` so `af sessions` survives a daemon restart; every other
/// event for an already-registered session bumps its `last_seen_at_ms`
/// via [`SessionRegistry::touch`].
pub fn ingest<C: Clock + 'static>(
    buffer: &EventBuffer,
    pool: &Pool<C>,
    registry: &SessionRegistry,
    project: &str,
    params: SessionEventParams,
    now_ms: u64,
) -> Result<(), IngestError> {
    let session_id = params
        .session_id
        .clone()
        .or_else(|| Event::extract_session_id(&params.data))
        .ok_or(IngestError::MissingSessionId)?;

    let timestamp_ms = params.timestamp.unwrap_or(now_ms);
    let event = Event { session_id: session_id.clone(), event_type: params.event_type, timestamp_ms, data: params.data };

    if event.event_type == event_type::SESSION_CREATED {
        if let Some(agent_id) = params.agent_id.as_deref() {
            pool.claim_session(agent_id, &session_id);
            register_session(pool, registry, project, agent_id, &session_id, now_ms);
        }
    } else if let Err(e) = registry.touch(&session_id, now_ms) {
        warn!(error = %e, session_id = %session_id, "failed to update session registry entry");
    }

    buffer.ingest(event, now_ms);
    Ok(())
}

/// Persist a newly correlated session, pulling the task id/origin/prompt
/// snippet from the agent the Pool just claimed it against.
fn register_session<C: Clock + 'static>(
    pool: &Pool<C>,
    registry: &SessionRegistry,
    project: &str,
    agent_id: &str,
    session_id: &str,
    now_ms: u64,
) {
    let Some(agent) = pool.agent_status(agent_id) else {
        debug_unknown_agent(agent_id, session_id);
        return;
    };
    let origin = if agent.task_id.is_empty() { SessionOrigin::Spawn } else { SessionOrigin::Pool };
    let prompt_snippet = pool
        .title_for(agent_id)
        .map(|t| t.chars().take(PROMPT_SNIPPET_CHARS).collect::<String>())
        .unwrap_or_default();

    let record = SessionRecord {
        session_id: session_id.to_string(),
        agent_id: agent_id.to_string(),
        task_id: agent.task_id,
        project: project.to_string(),
        server_url: pool.runtime_url().to_string(),
        origin,
        created_at_ms: now_ms,
        last_seen_at_ms: now_ms,
        prompt_snippet,
    };
    if let Err(e) = registry.insert(record) {
        warn!(error = %e, session_id = %session_id, "failed to persist session registry entry");
    }
}

fn debug_unknown_agent(agent_id: &str, session_id: &str) {
    tracing::debug!(agent_id, session_id, "session.created for unknown agent, not registering");
}

#[cfg(test)]
#[path = "ingest_tests.rs"]
mod tests;
