// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use crate::process::fake::FakeCommandRunner;
use crate::process::CommandOutput;

use super::*;

fn tasks_json() -> String {
    serde_json::to_string(&serde_json::json!([
        { "id": "task-1", "title": "fix the thing", "priority": 1, "status": "open" },
        { "id": "task-2", "title": "write docs", "priority": 2, "status": "open" },
    ]))
    .unwrap()
}

#[tokio::test]
async fn ready_parses_tracker_json_output() {
    let runner = Arc::new(FakeCommandRunner::new());
    runner.push_output(CommandOutput { status: 0, stdout: tasks_json(), stderr: String::new() });
    let tracker = Tracker::new(runner.clone(), "prog", "/tmp/project");

    let tasks = tracker.ready("demo").await.unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].id, "task-1");
    assert_eq!(runner.calls_for("prog")[0][0], "list");
}

fn strs(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn nonzero_exit_surfaces_command_failed() {
    let runner = Arc::new(FakeCommandRunner::new());
    runner.push_output(CommandOutput { status: 1, stdout: String::new(), stderr: "boom".into() });
    let tracker = Tracker::new(runner.clone(), "prog", "/tmp/project");

    let err = tracker.ready("demo").await.unwrap_err();
    assert!(matches!(err, TrackerError::CommandFailed { status: 1, .. }));
    assert_eq!(err.code(), "tracker.command_failed");
}

#[tokio::test]
async fn malformed_json_surfaces_parse_error() {
    let runner = Arc::new(FakeCommandRunner::new());
    runner.push_output(CommandOutput { status: 0, stdout: "not json".into(), stderr: String::new() });
    let tracker = Tracker::new(runner.clone(), "prog", "/tmp/project");

    let err = tracker.ready("demo").await.unwrap_err();
    assert!(matches!(err, TrackerError::Parse(_)));
}

#[tokio::test]
async fn tracker_output_with_invalid_task_id_is_rejected() {
    let runner = Arc::new(FakeCommandRunner::new());
    let bad = serde_json::to_string(&serde_json::json!([
        { "id": "../../etc/passwd", "title": "x", "priority": 1, "status": "open" },
    ]))
    .unwrap();
    runner.push_output(CommandOutput { status: 0, stdout: bad, stderr: String::new() });
    let tracker = Tracker::new(runner.clone(), "prog", "/tmp/project");

    let err = tracker.ready("demo").await.unwrap_err();
    assert!(matches!(err, TrackerError::InvalidTaskId(_)));
}

#[tokio::test]
async fn mark_in_progress_invokes_transition() {
    let runner = Arc::new(FakeCommandRunner::new());
    let tracker = Tracker::new(runner.clone(), "prog", "/tmp/project");
    tracker.mark_in_progress("task-1").await.unwrap();
    assert_eq!(runner.calls_for("prog")[0], strs(&["transition", "task-1", "in_progress"]));
}

#[tokio::test]
async fn mark_in_progress_rejects_invalid_task_id() {
    let runner = Arc::new(FakeCommandRunner::new());
    let tracker = Tracker::new(runner.clone(), "prog", "/tmp/project");
    let err = tracker.mark_in_progress("; rm -rf /").await.unwrap_err();
    assert!(matches!(err, TrackerError::InvalidTaskId(_)));
    assert_eq!(runner.call_count(), 0);
}

#[tokio::test]
async fn mark_blocked_carries_reason() {
    let runner = Arc::new(FakeCommandRunner::new());
    let tracker = Tracker::new(runner.clone(), "prog", "/tmp/project");
    tracker.mark_blocked("task-1", "retries exhausted").await.unwrap();
    assert_eq!(
        runner.calls_for("prog")[0],
        strs(&["transition", "task-1", "blocked", "--reason", "retries exhausted"])
    );
}
