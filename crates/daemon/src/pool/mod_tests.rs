// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use aether_core::{FakeClock, TaskStatus};

use crate::process::fake::{FakeCommandRunner, FakeProcessStarter};
use crate::process::CommandOutput;
use crate::tracker::Tracker;

use super::*;

fn task(id: &str) -> Task {
    Task { id: id.to_string(), title: "fix the thing".to_string(), priority: 1, status: TaskStatus::Open }
}

fn pool(
    pool_size: usize,
    max_retries: u32,
) -> (Arc<Pool<FakeClock>>, Arc<FakeProcessStarter>, Arc<FakeCommandRunner>) {
    let starter = Arc::new(FakeProcessStarter::new());
    let runner = Arc::new(FakeCommandRunner::new());
    let tracker = Arc::new(Tracker::new(runner.clone(), "prog", "/tmp/project"));
    let config = PoolConfig {
        pool_size,
        spawn_cmd: "opencode".to_string(),
        runtime_url: "http://127.0.0.1:4096".to_string(),
        project_dir: "/tmp/project".into(),
        max_retries,
    };
    let pool = Arc::new(Pool::new(config, starter.clone(), tracker, FakeClock::new(), |_name| Vec::new()));
    (pool, starter, runner)
}

#[tokio::test]
async fn spawn_transitions_tracker_before_starting_process() {
    let (pool, _starter, runner) = pool(4, 2);
    runner.push_output(CommandOutput { status: 0, stdout: String::new(), stderr: String::new() });

    let name = pool.spawn(&task("task-1")).await.unwrap();
    assert_eq!(pool.running_count(), 1);
    assert!(pool.agent_status(&name).is_none()); // keyed by task id, not agent name
    assert!(pool.agent_status("task-1").is_some());
    assert_eq!(runner.calls_for("prog")[0][0], "transition");
}

#[tokio::test]
async fn spawn_rejects_when_pool_full() {
    let (pool, _starter, runner) = pool(1, 2);
    runner.push_output(CommandOutput { status: 0, stdout: String::new(), stderr: String::new() });
    pool.spawn(&task("task-1")).await.unwrap();

    runner.push_output(CommandOutput { status: 0, stdout: String::new(), stderr: String::new() });
    let err = pool.spawn(&task("task-2")).await.unwrap_err();
    assert!(matches!(err, DaemonError::PoolFull { .. }));
}

#[tokio::test]
async fn spawn_rejects_when_not_active() {
    let (pool, _starter, _runner) = pool(4, 2);
    pool.set_mode(PoolMode::Paused);
    let err = pool.spawn(&task("task-1")).await.unwrap_err();
    assert!(matches!(err, DaemonError::PoolNotActive(_)));
}

#[tokio::test]
async fn claim_session_is_write_once() {
    let (pool, _starter, runner) = pool(4, 2);
    runner.push_output(CommandOutput { status: 0, stdout: String::new(), stderr: String::new() });
    pool.spawn(&task("task-1")).await.unwrap();

    pool.claim_session("task-1", "ses_a");
    pool.claim_session("task-1", "ses_b");
    assert_eq!(pool.agent_status("task-1").unwrap().session_id, Some("ses_a".to_string()));
}

#[tokio::test]
async fn claim_session_for_unknown_agent_is_a_noop() {
    let (pool, _starter, _runner) = pool(4, 2);
    pool.claim_session("ghost", "ses_a"); // must not panic
}

#[tokio::test]
async fn crashed_agent_is_respawned_with_decremented_retries() {
    let (pool, starter, runner) = pool(4, 2);
    runner.push_output(CommandOutput { status: 0, stdout: String::new(), stderr: String::new() }); // mark_in_progress
    pool.spawn(&task("task-1")).await.unwrap();
    let first_pid = pool.agent_status("task-1").unwrap().pid;

    starter.finish(first_pid, 1); // nonzero exit: crash
    // give the reaper + respawn tasks a chance to run
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    let agent = pool.agent_status("task-1").expect("respawned agent present");
    assert_eq!(agent.retries_remaining, 1);
    assert_ne!(agent.pid, first_pid);
}

#[tokio::test]
async fn clean_exit_is_not_respawned() {
    let (pool, starter, runner) = pool(4, 2);
    runner.push_output(CommandOutput { status: 0, stdout: String::new(), stderr: String::new() });
    pool.spawn(&task("task-1")).await.unwrap();
    let pid = pool.agent_status("task-1").unwrap().pid;

    starter.finish(pid, 0);
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    assert!(pool.agent_status("task-1").is_none());
    assert_eq!(pool.recent().len(), 1);
    assert_eq!(pool.recent()[0].exit_state, aether_core::ExitState::Clean);
}

#[tokio::test]
async fn kill_sends_signal_and_validates_agent_exists() {
    let (pool, _starter, runner) = pool(4, 2);
    runner.push_output(CommandOutput { status: 0, stdout: String::new(), stderr: String::new() });
    pool.spawn(&task("task-1")).await.unwrap();

    let err = pool.kill("ghost").await.unwrap_err();
    assert!(matches!(err, DaemonError::AgentNotFound(_)));

    // Real kill(2) targets a real OS pid; the fake starter's synthetic
    // pids (>= 1000) are very unlikely to be in use, but skip the
    // assertion rather than flake if this environment disagrees.
    let pid = pool.agent_status("task-1").unwrap().pid;
    if !crate::pidfile::is_process_alive(pid as i32) {
        pool.kill("task-1").await.unwrap();
    }
}

#[tokio::test]
async fn reclaim_respawns_in_progress_tasks_up_to_capacity() {
    let (pool, _starter, _runner) = pool(1, 2);
    let in_progress = vec![task("task-1"), task("task-2")];
    let reclaimed = pool.reclaim(in_progress).await;
    assert_eq!(reclaimed, 1);
    assert_eq!(pool.running_count(), 1);
}

#[tokio::test]
async fn reclaim_is_skipped_when_paused() {
    let (pool, _starter, _runner) = pool(4, 2);
    pool.set_mode(PoolMode::Paused);
    let reclaimed = pool.reclaim(vec![task("task-1")]).await;
    assert_eq!(reclaimed, 0);
}

#[test]
fn set_mode_updates_mode() {
    let (pool, _starter, _runner) = pool(4, 2);
    assert_eq!(pool.mode(), PoolMode::Active);
    pool.set_mode(PoolMode::Draining);
    assert_eq!(pool.mode(), PoolMode::Draining);
}

#[tokio::test]
async fn spawn_freeform_has_no_task_id_and_is_keyed_by_its_own_name() {
    let (pool, _starter, _runner) = pool(4, 2);
    let name = pool.spawn_freeform("do something useful", Role::Worker).await.unwrap();
    let agent = pool.agent_status(&name).unwrap();
    assert_eq!(agent.task_id, "");
    assert_eq!(agent.role, Role::Worker);
    assert_eq!(pool.running_count(), 1);
}

#[tokio::test]
async fn spawn_freeform_rejects_when_pool_full() {
    let (pool, _starter, runner) = pool(1, 2);
    runner.push_output(CommandOutput { status: 0, stdout: String::new(), stderr: String::new() });
    pool.spawn(&task("task-1")).await.unwrap();

    let err = pool.spawn_freeform("anything", Role::Worker).await.unwrap_err();
    assert!(matches!(err, DaemonError::PoolFull { .. }));
}

#[tokio::test]
async fn spawn_freeform_does_not_respawn_on_crash() {
    let (pool, starter, _runner) = pool(4, 2);
    let name = pool.spawn_freeform("anything", Role::Worker).await.unwrap();
    let pid = pool.agent_status(&name).unwrap().pid;

    starter.finish(pid, 1); // nonzero exit: crash
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    assert_eq!(pool.running_count(), 0);
}

#[tokio::test]
async fn title_for_remembers_the_freeform_prompt_text() {
    let (pool, _starter, _runner) = pool(4, 2);
    let name = pool.spawn_freeform("investigate the flaky test", Role::Worker).await.unwrap();
    assert_eq!(pool.title_for(&name).as_deref(), Some("investigate the flaky test"));
}

#[test]
fn runtime_url_matches_the_configured_value() {
    let (pool, _starter, _runner) = pool(4, 2);
    assert_eq!(pool.runtime_url(), "http://127.0.0.1:4096");
}
