// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `af drain` / `af pause` / `af resume` - pool admission control.

use aether_wire::{method, PoolModeResult};
use serde_json::json;

use crate::client::RpcClient;
use crate::exit_error::ExitError;
use crate::output::{print_pool_mode, OutputFormat};

pub async fn drain(client: &RpcClient, format: OutputFormat) -> Result<(), ExitError> {
    set_mode(client, method::POOL_DRAIN, format).await
}

pub async fn pause(client: &RpcClient, format: OutputFormat) -> Result<(), ExitError> {
    set_mode(client, method::POOL_PAUSE, format).await
}

pub async fn resume(client: &RpcClient, format: OutputFormat) -> Result<(), ExitError> {
    set_mode(client, method::POOL_RESUME, format).await
}

async fn set_mode(client: &RpcClient, method: &str, format: OutputFormat) -> Result<(), ExitError> {
    let result = client.call(method, json!({})).await.map_err(|e| ExitError::new(e.exit_code(), e.to_string()))?;
    let result: PoolModeResult = serde_json::from_value(result.unwrap_or(serde_json::Value::Null))
        .map_err(|e| ExitError::new(1, format!("malformed response from aetherd: {e}")))?;
    print_pool_mode(&result, format).map_err(|e| ExitError::new(1, e.to_string()))
}
