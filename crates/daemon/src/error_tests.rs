// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn agent_not_found_code_is_stable() {
    let err = DaemonError::AgentNotFound("brave_otter".to_string());
    assert_eq!(err.code(), "agent.not_found");
}

#[test]
fn wire_error_delegates_code() {
    let err = DaemonError::Wire(aether_wire::ProtocolError::Eof);
    assert_eq!(err.code(), "wire.eof");
}

#[test]
fn to_terminal_string_strips_control_characters() {
    let err = DaemonError::Internal("boom\x07".to_string());
    assert_eq!(err.to_terminal_string(), "internal error: boom");
}
