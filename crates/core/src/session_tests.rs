// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn sample() -> SessionRecord {
    SessionRecord {
        session_id: "ses_abc".to_string(),
        agent_id: "brave_otter".to_string(),
        task_id: "ts-aaaaaa".to_string(),
        project: "demo".to_string(),
        server_url: "http://127.0.0.1:4096".to_string(),
        origin: SessionOrigin::Pool,
        created_at_ms: 1_000,
        last_seen_at_ms: 1_000,
        prompt_snippet: "do the thing".to_string(),
    }
}

#[test]
fn touch_updates_last_seen() {
    let mut s = sample();
    s.touch(5_000);
    assert_eq!(s.last_seen_at_ms, 5_000);
}

#[test]
fn is_idle_respects_ttl() {
    let s = sample();
    assert!(!s.is_idle(10_000, 48 * 3_600_000));
    assert!(s.is_idle(1_000 + 48 * 3_600_000, 48 * 3_600_000));
}

#[test]
fn origin_display() {
    assert_eq!(SessionOrigin::Pool.to_string(), "pool");
    assert_eq!(SessionOrigin::Manual.to_string(), "manual");
}
