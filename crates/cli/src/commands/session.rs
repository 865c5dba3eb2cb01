// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `af sessions` / `af session attach <id>` - registry discovery plus a
//! tail of buffered events for one session. The registry file is read
//! directly (the daemon keeps no separate "list sessions" RPC); the
//! live event tail goes through `events.list`, the same RPC `af logs`
//! uses for a single agent.

use std::time::Duration;

use aether_daemon::session_registry::SessionRegistry;
use aether_wire::{method, EventsListParams, EventsListResult};
use serde_json::json;

use crate::client::RpcClient;
use crate::exit_error::ExitError;
use crate::output::OutputFormat;

pub async fn sessions(project: &str, format: OutputFormat) -> Result<(), ExitError> {
    let registry = SessionRegistry::load(SessionRegistry::default_path(project))
        .map_err(|e| ExitError::new(1, format!("failed to read session registry: {e}")))?;
    let records = registry.for_project(project);

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&records).map_err(|e| ExitError::new(1, e.to_string()))?);
        }
        OutputFormat::Text => {
            if records.is_empty() {
                println!("no known sessions for project {project:?}");
            }
            for r in &records {
                println!("{}  agent {}  task {}  origin {}", r.session_id, r.agent_id, if r.task_id.is_empty() { "-" } else { &r.task_id }, r.origin);
            }
        }
    }
    Ok(())
}

pub async fn attach(client: &RpcClient, session_id: &str, follow: bool) -> Result<(), ExitError> {
    let mut after_ms = 0u64;
    loop {
        let params = EventsListParams { session_id: session_id.to_string(), after_ms, limit: 500 };
        let result = client
            .call(method::EVENTS_LIST, serde_json::to_value(params).expect("serializes"))
            .await
            .map_err(|e| ExitError::new(e.exit_code(), e.to_string()))?;
        let result: EventsListResult =
            serde_json::from_value(result.unwrap_or(serde_json::Value::Null)).map_err(|e| ExitError::new(1, format!("malformed response from aetherd: {e}")))?;

        for event in &result.events {
            println!("[{}] {}", event.timestamp_ms, event.event_type);
        }
        // `after_ms` is the Event Buffer's opaque per-session sequence
        // cursor, not a timestamp; advance it by the count just consumed.
        after_ms += result.events.len() as u64;

        if !follow {
            return Ok(());
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
}
