// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `af status [agent]` and `af logs <agent>` - pool and per-agent views.

use std::time::Duration;

use aether_wire::{method, AgentStatusParams, AgentStatusResult, LogsPathParams, LogsPathResult, StatusFullResult, StatusResult};
use serde_json::json;

use crate::client::RpcClient;
use crate::exit_error::ExitError;
use crate::output::{print_status, print_status_full, OutputFormat};

pub async fn status(client: &RpcClient, agent: Option<String>, watch: bool, interval: Duration, format: OutputFormat) -> Result<(), ExitError> {
    loop {
        match &agent {
            Some(agent_id) => print_agent(client, agent_id, format).await?,
            None => print_pool(client, format).await?,
        }
        if !watch {
            return Ok(());
        }
        tokio::time::sleep(interval).await;
        println!();
    }
}

async fn print_pool(client: &RpcClient, format: OutputFormat) -> Result<(), ExitError> {
    let result = client.call(method::STATUS_FULL, json!({})).await.map_err(from_client)?;
    let result: StatusFullResult = decode(result)?;
    print_status_full(&result, format).map_err(render_err)
}

async fn print_agent(client: &RpcClient, agent_id: &str, format: OutputFormat) -> Result<(), ExitError> {
    let params = AgentStatusParams { agent_id: agent_id.to_string(), limit: 50 };
    let result = client.call(method::STATUS_AGENT, serde_json::to_value(params).expect("serializes")).await.map_err(from_client)?;
    let result: AgentStatusResult = decode(result)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result).map_err(render_err)?),
        OutputFormat::Text => {
            println!("{} ({})  pid {}", result.agent.id, result.agent.state, result.agent.pid);
            for call in &result.tool_calls {
                println!("  {:<10} {}", call.tool, call.input);
            }
        }
    }
    Ok(())
}

/// Also serves `af status` with no pool size filter; kept separate from
/// `print_pool` so `status.full`'s error aggregation stays a text-mode
/// detail and `status` alone (the pool-only view) stays cheap.
pub async fn pool_summary(client: &RpcClient, format: OutputFormat) -> Result<(), ExitError> {
    let result = client.call(method::STATUS, json!({})).await.map_err(from_client)?;
    let result: StatusResult = decode(result)?;
    print_status(&result, format).map_err(render_err)
}

pub async fn logs(client: &RpcClient, agent_id: &str, follow: bool) -> Result<(), ExitError> {
    let mut printed = 0usize;
    loop {
        let params = LogsPathParams { agent_id: agent_id.to_string() };
        let result = client.call(method::LOGS_PATH, serde_json::to_value(params).expect("serializes")).await.map_err(from_client)?;
        let result: LogsPathResult = decode(result)?;
        for line in result.lines.iter().skip(printed) {
            println!("{line}");
        }
        printed = result.lines.len();
        if !follow {
            return Ok(());
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
}

pub async fn kill(client: &RpcClient, agent_id: &str) -> Result<(), ExitError> {
    client
        .call(method::AGENT_KILL, json!({ "agent_id": agent_id }))
        .await
        .map_err(from_client)?;
    println!("killed {agent_id}");
    Ok(())
}

fn decode<T: serde::de::DeserializeOwned>(value: Option<serde_json::Value>) -> Result<T, ExitError> {
    let value = value.unwrap_or(serde_json::Value::Null);
    serde_json::from_value(value).map_err(|e| ExitError::new(1, format!("malformed response from aetherd: {e}")))
}

fn from_client(e: crate::client::ClientError) -> ExitError {
    ExitError::new(e.exit_code(), e.to_string())
}

fn render_err(e: anyhow::Error) -> ExitError {
    ExitError::new(1, e.to_string())
}
