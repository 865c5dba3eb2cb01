// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Newline-delimited JSON framing over any `AsyncRead`/`AsyncWrite` pair,
//! matching the teacher's split-owned-halves connection handling but with
//! NDJSON framing in place of the teacher's length-prefixed binary wire.

use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::{Request, Response};

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("connection closed before a full line was read")]
    Eof,
    #[error("no request received within {0:?}")]
    Timeout(Duration),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProtocolError {
    pub fn code(&self) -> &'static str {
        match self {
            ProtocolError::Eof => "wire.eof",
            ProtocolError::Timeout(_) => "wire.timeout",
            ProtocolError::Io(_) => "wire.io",
            ProtocolError::Json(_) => "wire.malformed",
        }
    }
}

/// Read one line from `reader` and parse it as a [`Request`], bounded by
/// `deadline` (the listener's `ipc_timeout`). A connection that writes a
/// partial line and stalls is disconnected rather than left hanging.
pub async fn read_request<R>(
    reader: &mut BufReader<R>,
    deadline: Duration,
) -> Result<Request, ProtocolError>
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut line = String::new();
    let n = tokio::time::timeout(deadline, reader.read_line(&mut line))
        .await
        .map_err(|_| ProtocolError::Timeout(deadline))??;
    if n == 0 {
        return Err(ProtocolError::Eof);
    }
    Ok(serde_json::from_str(line.trim_end())?)
}

/// Read one line from `reader` and parse it as a [`Response`], used by the
/// CLI thin client talking to the daemon.
pub async fn read_response<R>(reader: &mut BufReader<R>) -> Result<Response, ProtocolError>
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut line = String::new();
    let n = reader.read_line(&mut line).await?;
    if n == 0 {
        return Err(ProtocolError::Eof);
    }
    Ok(serde_json::from_str(line.trim_end())?)
}

/// Write a [`Request`] as one NDJSON line.
pub async fn write_request<W>(writer: &mut W, request: &Request) -> Result<(), ProtocolError>
where
    W: tokio::io::AsyncWrite + Unpin,
{
    let mut line = serde_json::to_vec(request)?;
    line.push(b'\n');
    writer.write_all(&line).await?;
    writer.flush().await?;
    Ok(())
}

/// Write a [`Response`] as one NDJSON line.
pub async fn write_response<W>(writer: &mut W, response: &Response) -> Result<(), ProtocolError>
where
    W: tokio::io::AsyncWrite + Unpin,
{
    let mut line = serde_json::to_vec(response)?;
    line.push(b'\n');
    writer.write_all(&line).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
