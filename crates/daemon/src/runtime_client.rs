// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin HTTP client for the AI runtime's REST surface: session listing
//! (startup reconciliation), message backfill, and a liveness probe for
//! the Runtime Supervisor.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

const DEFAULT_PARSE_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, thiserror::Error)]
pub enum RuntimeClientError {
    #[error("runtime request timed out after {0:?}")]
    Timeout(Duration),
    #[error("runtime is unreachable: {0}")]
    Transient(String),
    #[error("runtime returned an error: {0}")]
    Fatal(String),
}

impl RuntimeClientError {
    pub fn code(&self) -> &'static str {
        match self {
            RuntimeClientError::Timeout(_) => "runtime.timeout",
            RuntimeClientError::Transient(_) => "runtime.transient",
            RuntimeClientError::Fatal(_) => "runtime.fatal",
        }
    }

    /// Whether a caller should retry this request with backoff.
    pub fn is_transient(&self) -> bool {
        matches!(self, RuntimeClientError::Timeout(_) | RuntimeClientError::Transient(_))
    }

    fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RuntimeClientError::Timeout(DEFAULT_PARSE_TIMEOUT)
        } else if e.is_connect() {
            RuntimeClientError::Transient(e.to_string())
        } else {
            RuntimeClientError::Fatal(e.to_string())
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeSession {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub created_at_ms: u64,
    #[serde(default)]
    pub updated_at_ms: u64,
    #[serde(default)]
    pub directory: String,
}

pub struct RuntimeClient {
    base_url: String,
    http: reqwest::Client,
}

impl RuntimeClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), http: reqwest::Client::new() }
    }

    /// Enumerate known sessions for startup reconciliation.
    pub async fn list_sessions(&self) -> Result<Vec<RuntimeSession>, RuntimeClientError> {
        let url = format!("{}/session", self.base_url);
        self.get_json(&url, DEFAULT_PARSE_TIMEOUT).await
    }

    /// Full message tree for backfill (ToolCalls reconstructed without
    /// re-reading logs).
    pub async fn get_messages(&self, session_id: &str) -> Result<Vec<Value>, RuntimeClientError> {
        let url = format!("{}/session/{session_id}/message", self.base_url);
        self.get_json(&url, DEFAULT_PARSE_TIMEOUT).await
    }

    /// Liveness probe for the Runtime Supervisor.
    pub async fn health(&self) -> Result<bool, RuntimeClientError> {
        let url = format!("{}/doc", self.base_url);
        let resp = tokio::time::timeout(DEFAULT_SESSION_TIMEOUT, self.http.get(&url).send())
            .await
            .map_err(|_| RuntimeClientError::Timeout(DEFAULT_SESSION_TIMEOUT))?
            .map_err(RuntimeClientError::from_reqwest)?;
        Ok(resp.status().is_success())
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        deadline: Duration,
    ) -> Result<T, RuntimeClientError> {
        let resp = tokio::time::timeout(deadline, self.http.get(url).send())
            .await
            .map_err(|_| RuntimeClientError::Timeout(deadline))?
            .map_err(RuntimeClientError::from_reqwest)?;

        if !resp.status().is_success() {
            return Err(RuntimeClientError::Fatal(format!("status {}", resp.status())));
        }

        tokio::time::timeout(deadline, resp.json::<T>())
            .await
            .map_err(|_| RuntimeClientError::Timeout(deadline))?
            .map_err(RuntimeClientError::from_reqwest)
    }
}

#[cfg(test)]
#[path = "runtime_client_tests.rs"]
mod tests;
