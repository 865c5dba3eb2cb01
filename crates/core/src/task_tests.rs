// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn accepts_ordinary_ids() {
    assert!(validate_task_id("ts-aaaaaa").is_ok());
    assert!(validate_task_id("TASK_123.x").is_ok());
    assert!(validate_task_id("a").is_ok());
}

#[test]
fn rejects_path_traversal() {
    assert!(validate_task_id("../../etc/evil").is_err());
}

#[test]
fn rejects_leading_dash_or_flag_like_ids() {
    assert!(validate_task_id("-rf").is_err());
    assert!(validate_task_id("--kill").is_err());
}

#[test]
fn rejects_empty_and_whitespace() {
    assert!(validate_task_id("").is_err());
    assert!(validate_task_id(" ").is_err());
    assert!(validate_task_id("a b").is_err());
}

#[test]
fn task_validate_delegates_to_free_function() {
    let t = Task {
        id: "ts-bad id".to_string(),
        title: "x".to_string(),
        priority: 1,
        status: TaskStatus::Open,
    };
    assert!(t.validate().is_err());
}

#[test]
fn task_status_display() {
    assert_eq!(TaskStatus::InProgress.to_string(), "in_progress");
    assert_eq!(TaskStatus::Reviewing.to_string(), "reviewing");
}

#[test]
fn validate_project_name_rejects_path_traversal() {
    assert!(validate_project_name("../../etc/evil").is_err());
}

#[test]
fn validate_project_name_accepts_ordinary_name() {
    assert!(validate_project_name("demo").is_ok());
    assert!(validate_project_name("my-project.v2").is_ok());
}
