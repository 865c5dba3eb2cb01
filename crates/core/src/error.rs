// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared error kinds and stable cause tags.
//!
//! Every crate-local error type exposes a `code()` returning one of these
//! tags so RPC handlers can log `code = err.code()` as a structured field
//! while `Display` stays free to carry a human-readable message.

use thiserror::Error;

/// Stable, grep-friendly cause tags shared across the kernel.
///
/// New variants are append-only: changing an existing tag breaks any
/// operator tooling that greps for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    AgentNotFound,
    PoolFull,
    PoolNotActive,
    SessionConflict,
    NameExhausted,
    InvalidTaskId,
    InvalidProjectName,
    TrackerFailed,
    RuntimeUnhealthy,
    Internal,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::AgentNotFound => "agent.not_found",
            ErrorCode::PoolFull => "pool.full",
            ErrorCode::PoolNotActive => "pool.not_active",
            ErrorCode::SessionConflict => "session.conflict",
            ErrorCode::NameExhausted => "name.exhausted",
            ErrorCode::InvalidTaskId => "task.invalid_id",
            ErrorCode::InvalidProjectName => "project.invalid_name",
            ErrorCode::TrackerFailed => "tracker.failed",
            ErrorCode::RuntimeUnhealthy => "runtime.unhealthy",
            ErrorCode::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors shared across core data-model operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid task id {0:?}: must match {1}")]
    InvalidTaskId(String, &'static str),

    #[error("invalid project name {0:?}: must match {1}")]
    InvalidProjectName(String, &'static str),
}

impl CoreError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::InvalidTaskId(..) => ErrorCode::InvalidTaskId,
            CoreError::InvalidProjectName(..) => ErrorCode::InvalidProjectName,
        }
    }
}

/// Strip control characters (other than newline/tab) from a string that
/// will cross a trust boundary to a terminal, per the error-handling
/// design's requirement that such strings never carry raw control bytes.
pub fn sanitize_for_terminal(s: &str) -> String {
    s.chars().filter(|c| !c.is_control() || *c == '\n' || *c == '\t').collect()
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
