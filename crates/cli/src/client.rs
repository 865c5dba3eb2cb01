// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin RPC client: sends one [`Request`] and reads back the matching
//! [`Response`], one connection per call, matching the daemon's
//! one-task-per-connection accept loop.

use std::path::{Path, PathBuf};
use std::time::Duration;

use aether_wire::{read_response, write_request, ProtocolError, Request, Response};
use serde_json::Value;
use thiserror::Error;
use tokio::io::BufReader;
use tokio::net::UnixStream;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("could not connect to aetherd at {0}: is the daemon running? ({1})")]
    Connect(PathBuf, std::io::Error),
    #[error("no response from aetherd within {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("{0}")]
    Rpc(String),
}

impl ClientError {
    /// Every client-side failure maps to exit code 1 per the CLI contract
    /// (`af`'s invalid-argument cases are rejected by clap before a
    /// `ClientError` can even arise, and exit with code 2 there instead).
    pub fn exit_code(&self) -> i32 {
        1
    }
}

pub struct RpcClient {
    socket_path: PathBuf,
    timeout: Duration,
}

impl RpcClient {
    pub fn new(socket_path: PathBuf) -> Self {
        Self { socket_path, timeout: DEFAULT_TIMEOUT }
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Issue one RPC call and return its decoded result, or a
    /// [`ClientError::Rpc`] if the daemon reported failure.
    pub async fn call(&self, method: &str, params: Value) -> Result<Option<Value>, ClientError> {
        let stream = UnixStream::connect(&self.socket_path)
            .await
            .map_err(|e| ClientError::Connect(self.socket_path.clone(), e))?;
        let (read_half, mut write_half) = stream.into_split();
        let mut reader = BufReader::new(read_half);

        write_request(&mut write_half, &Request::new(method, params)).await?;
        let response: Response = tokio::time::timeout(self.timeout, read_response(&mut reader))
            .await
            .map_err(|_| ClientError::Timeout(self.timeout))??;

        if response.is_success() {
            Ok(response.result)
        } else {
            Err(ClientError::Rpc(response.error.unwrap_or_else(|| "unknown error".to_string())))
        }
    }
}
