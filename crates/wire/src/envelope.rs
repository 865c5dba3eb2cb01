// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request/response envelopes exchanged over the RPC transport.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single RPC call: a method name plus opaque parameters.
///
/// `params` is deliberately untyped at this layer — each method's
/// params/result shape lives in [`crate::types`] and is decoded by the
/// handler that owns that method, not by the envelope itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Request {
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

impl Request {
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self { method: method.into(), params }
    }

    pub fn with_no_params(method: impl Into<String>) -> Self {
        Self { method: method.into(), params: Value::Null }
    }
}

/// Reply to a [`Request`]. Exactly one of `result`/`error` is populated on
/// success/failure respectively; `success` is redundant with that but kept
/// explicit so callers never need to infer outcome from presence alone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Response {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    pub fn ok(result: Value) -> Self {
        Self { success: true, result: Some(result), error: None }
    }

    pub fn ok_empty() -> Self {
        Self { success: true, result: None, error: None }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self { success: false, result: None, error: Some(message.into()) }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }
}

#[cfg(test)]
#[path = "envelope_tests.rs"]
mod tests;
