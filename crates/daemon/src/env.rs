// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;

/// Override the computed socket path. Set by the CLI when launching the
/// daemon, or by an operator pinning a non-default location.
pub fn socket_override() -> Option<PathBuf> {
    std::env::var("AETHERFLOW_SOCKET").ok().map(PathBuf::from).filter(|s| !s.as_os_str().is_empty())
}

/// Tracing filter directive: `AETHERFLOW_LOG`, falling back to `RUST_LOG`,
/// defaulting to `info`.
pub fn log_filter() -> String {
    std::env::var("AETHERFLOW_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string())
}

/// Env vars injected into every spawned agent subprocess so the embedded
/// plugin can reach the kernel's ingest endpoint and tag its events.
pub fn agent_env(socket_path: &std::path::Path, agent_id: &str) -> Vec<(String, String)> {
    vec![
        ("AETHERFLOW_SOCKET".to_string(), socket_path.display().to_string()),
        ("AETHERFLOW_AGENT_ID".to_string(), agent_id.to_string()),
    ]
}
