// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::{CliOverrides, Config, ConfigFile};

use super::*;

fn test_config(project: &str) -> Config {
    Config::resolve(std::path::Path::new("/tmp"), CliOverrides { project: Some(project.to_string()), ..Default::default() }, ConfigFile::default())
        .unwrap()
}

#[test]
fn remote_from_integration_ref_takes_the_branch_before_the_slash() {
    assert_eq!(remote_from_integration_ref("origin/main"), "origin");
    assert_eq!(remote_from_integration_ref("upstream/release-1.0"), "upstream");
}

#[test]
fn remote_from_integration_ref_falls_back_to_origin_without_a_slash() {
    assert_eq!(remote_from_integration_ref("main"), "origin");
}

#[tokio::test]
async fn on_cancel_resolves_once_the_token_is_cancelled() {
    let token = CancellationToken::new();
    let rx = on_cancel(token.clone());
    token.cancel();
    tokio::time::timeout(Duration::from_secs(1), rx).await.unwrap().unwrap();
}

#[tokio::test]
async fn run_refuses_to_start_when_a_pid_file_names_a_live_process() {
    let config = test_config("orchestrator-already-running-test");
    let pid_path = config.pid_path();
    std::fs::write(&pid_path, std::process::id().to_string()).unwrap();

    let err = run(config).await.unwrap_err();
    assert!(matches!(err, OrchestratorError::PidFile(PidFileError::AlreadyRunning(_))));

    let _ = std::fs::remove_file(&pid_path);
}

#[tokio::test]
async fn run_removes_a_stale_pid_file_naming_a_dead_process() {
    let config = test_config("orchestrator-stale-pid-test");
    let pid_path = config.pid_path();
    let socket_path = config.socket_path();
    let _ = std::fs::remove_file(&socket_path);
    // pid 999999 is never a real process on the test host.
    std::fs::write(&pid_path, "999999").unwrap();

    // check_daemon_running clears the stale file; bind_socket then succeeds,
    // so the run fails later (no runtime binary to spawn) rather than on
    // the pidfile check.
    let err = run(config).await.unwrap_err();
    assert!(!matches!(err, OrchestratorError::PidFile(PidFileError::AlreadyRunning(_))));

    let _ = std::fs::remove_file(&pid_path);
    let _ = std::fs::remove_file(&socket_path);
}

#[tokio::test]
async fn reconcile_sessions_against_an_unreachable_runtime_is_a_noop() {
    let tmp = tempfile::tempdir().unwrap();
    let registry = SessionRegistry::load(tmp.path().join("sessions-demo.json")).unwrap();
    let buffer = EventBuffer::new(16);
    let client = RuntimeClient::new("http://127.0.0.1:1");

    reconcile_sessions(&registry, &buffer, &client, "demo").await;

    assert!(registry.is_empty());
    assert_eq!(buffer.session_count(), 0);
}

#[tokio::test]
async fn eviction_loop_stops_promptly_on_shutdown() {
    let registry = Arc::new(SessionRegistry::load(tempfile::tempdir().unwrap().path().join("sessions-demo.json")).unwrap());
    let buffer = Arc::new(EventBuffer::new(16));
    let token = CancellationToken::new();
    let shutdown = on_cancel(token.clone());
    let handle = tokio::spawn(run_eviction_loop(buffer, registry, "demo".to_string(), Duration::from_secs(48 * 3600), shutdown));

    token.cancel();
    tokio::time::timeout(Duration::from_secs(1), handle).await.unwrap().unwrap();
}
