// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn dir() -> PathBuf {
    PathBuf::from("/tmp/demo-project")
}

#[test]
fn defaults_project_name_from_directory() {
    let cfg = Config::resolve(&dir(), CliOverrides::default(), ConfigFile::default()).unwrap();
    assert_eq!(cfg.project, "demo-project");
    assert_eq!(cfg.pool_size, 4);
    assert_eq!(cfg.policy, Policy::Manual);
}

#[test]
fn cli_override_wins_over_file() {
    let file = ConfigFile { project: Some("from-file".to_string()), ..Default::default() };
    let overrides = CliOverrides { project: Some("from-cli".to_string()), ..Default::default() };
    let cfg = Config::resolve(&dir(), overrides, file).unwrap();
    assert_eq!(cfg.project, "from-cli");
}

#[test]
fn file_wins_over_default() {
    let file = ConfigFile { pool_size: Some(9), ..Default::default() };
    let cfg = Config::resolve(&dir(), CliOverrides::default(), file).unwrap();
    assert_eq!(cfg.pool_size, 9);
}

#[test]
fn rejects_path_traversal_project_name() {
    let overrides = CliOverrides { project: Some("../../etc/evil".to_string()), ..Default::default() };
    let err = Config::resolve(&dir(), overrides, ConfigFile::default()).unwrap_err();
    assert_eq!(err.code(), "project.invalid_name");
}

#[test]
fn rejects_zero_pool_size() {
    let file = ConfigFile { pool_size: Some(0), ..Default::default() };
    let err = Config::resolve(&dir(), CliOverrides::default(), file).unwrap_err();
    assert!(matches!(err, ConfigError::PoolSizeZero(0)));
}

#[test]
fn rejects_reconcile_interval_under_5s() {
    let file = ConfigFile { reconcile_interval_ms: Some(1_000), ..Default::default() };
    let err = Config::resolve(&dir(), CliOverrides::default(), file).unwrap_err();
    assert!(matches!(err, ConfigError::ReconcileIntervalTooShort(_)));
}

#[test]
fn socket_and_pid_paths_are_scoped_to_project() {
    let cfg = Config::resolve(&dir(), CliOverrides::default(), ConfigFile::default()).unwrap();
    assert_eq!(cfg.socket_path(), std::env::temp_dir().join("aetherd-demo-project.sock"));
    assert_eq!(cfg.pid_path(), std::env::temp_dir().join("aetherd-demo-project.pid"));
}

#[test]
fn load_file_returns_defaults_when_absent() {
    let tmp = tempfile::tempdir().unwrap();
    let file = Config::load_file(tmp.path()).unwrap();
    assert_eq!(file.project, None);
}

#[test]
fn load_file_parses_present_yaml() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("aetherflow.yaml"), "pool_size: 7\npolicy: auto\n").unwrap();
    let file = Config::load_file(tmp.path()).unwrap();
    assert_eq!(file.pool_size, Some(7));
    assert_eq!(file.policy, Some(Policy::Auto));
}
