// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn agent_status_params_defaults_limit_when_absent() {
    let v = serde_json::json!({"agent_id": "brave_otter"});
    let params: AgentStatusParams = serde_json::from_value(v).unwrap();
    assert_eq!(params.limit, 50);
}

#[test]
fn events_list_params_defaults_after_ms_and_limit() {
    let v = serde_json::json!({"session_id": "ses_1"});
    let params: EventsListParams = serde_json::from_value(v).unwrap();
    assert_eq!(params.after_ms, 0);
    assert_eq!(params.limit, 500);
}

#[test]
fn session_event_params_allows_missing_agent_and_session() {
    let v = serde_json::json!({"event_type": "session.created"});
    let params: SessionEventParams = serde_json::from_value(v).unwrap();
    assert_eq!(params.agent_id, None);
    assert_eq!(params.session_id, None);
    assert_eq!(params.data, serde_json::Value::Null);
}

#[test]
fn pool_mode_result_round_trips() {
    let result = PoolModeResult { mode: aether_core::PoolMode::Draining, running: 2 };
    let encoded = serde_json::to_string(&result).unwrap();
    let decoded: PoolModeResult = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, result);
}
