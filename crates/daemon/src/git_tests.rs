// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use crate::process::fake::FakeCommandRunner;
use crate::process::CommandOutput;

use super::*;

fn ok() -> CommandOutput {
    CommandOutput { status: 0, stdout: String::new(), stderr: String::new() }
}

fn fail() -> CommandOutput {
    CommandOutput { status: 1, stdout: String::new(), stderr: "not found".into() }
}

#[tokio::test]
async fn fetch_success() {
    let runner = Arc::new(FakeCommandRunner::new());
    runner.push_output(ok());
    let git = Git::new(runner.clone(), "/repo");
    git.fetch("origin").await.unwrap();
    assert_eq!(runner.calls_for("git")[0], vec!["fetch".to_string(), "origin".to_string()]);
}

#[tokio::test]
async fn fetch_failure_is_reported_not_panicked() {
    let runner = Arc::new(FakeCommandRunner::new());
    runner.push_output(fail());
    let git = Git::new(runner.clone(), "/repo");
    let err = git.fetch("origin").await.unwrap_err();
    assert!(matches!(err, GitError::CommandFailed(_)));
}

#[tokio::test]
async fn missing_branch_is_treated_as_merged() {
    let runner = Arc::new(FakeCommandRunner::new());
    runner.push_output(fail()); // rev-parse --verify fails: branch absent
    let git = Git::new(runner.clone(), "/repo");
    assert!(git.is_merged("af/task-1", "origin/main").await.unwrap());
}

#[tokio::test]
async fn branch_is_ancestor_of_integration_ref() {
    let runner = Arc::new(FakeCommandRunner::new());
    runner.push_output(ok()); // rev-parse --verify succeeds: branch exists
    runner.push_output(ok()); // merge-base --is-ancestor succeeds
    let git = Git::new(runner.clone(), "/repo");
    assert!(git.is_merged("af/task-1", "origin/main").await.unwrap());
}

#[tokio::test]
async fn branch_not_yet_merged() {
    let runner = Arc::new(FakeCommandRunner::new());
    runner.push_output(ok()); // branch exists
    runner.push_output(fail()); // not an ancestor
    let git = Git::new(runner.clone(), "/repo");
    assert!(!git.is_merged("af/task-1", "origin/main").await.unwrap());
}
