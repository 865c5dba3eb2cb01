// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn error_code_as_str_is_stable() {
    assert_eq!(ErrorCode::AgentNotFound.as_str(), "agent.not_found");
    assert_eq!(ErrorCode::PoolFull.as_str(), "pool.full");
    assert_eq!(ErrorCode::SessionConflict.as_str(), "session.conflict");
}

#[test]
fn sanitize_strips_control_characters() {
    let dirty = "hello\x07world\x1b[31m!";
    let clean = sanitize_for_terminal(dirty);
    assert_eq!(clean, "helloworld[31m!");
}

#[test]
fn sanitize_preserves_newlines_and_tabs() {
    let s = "line one\n\tindented";
    assert_eq!(sanitize_for_terminal(s), s);
}

#[test]
fn core_error_code_mapping() {
    let e = CoreError::InvalidTaskId("../x".to_string(), "pattern");
    assert_eq!(e.code().as_str(), "task.invalid_id");
}
