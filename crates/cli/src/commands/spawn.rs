// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `af spawn <prompt>` - start a freeform agent with no tracker-backed
//! task, for ad-hoc work outside the Poller's task-driven scheduling.

use aether_core::Role;
use aether_wire::{method, AgentSpawnParams, AgentSpawnResult};

use crate::client::RpcClient;
use crate::exit_error::ExitError;

pub async fn spawn(client: &RpcClient, prompt: &str, role: Role) -> Result<(), ExitError> {
    let params = AgentSpawnParams { prompt: prompt.to_string(), role };
    let result = client
        .call(method::AGENT_SPAWN, serde_json::to_value(params).expect("serializes"))
        .await
        .map_err(|e| ExitError::new(e.exit_code(), e.to_string()))?;
    let result: AgentSpawnResult = serde_json::from_value(result.unwrap_or(serde_json::Value::Null))
        .map_err(|e| ExitError::new(1, format!("malformed response from aetherd: {e}")))?;
    println!("spawned {}", result.agent_id);
    Ok(())
}
