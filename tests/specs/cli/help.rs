//! `af --help` / `af --version` output.

use crate::prelude::*;

#[test]
fn af_help_shows_usage() {
    cli().args(&["--help"]).passes().stdout_has("Usage:");
}

#[test]
fn af_version_shows_version() {
    cli().args(&["--version"]).passes().stdout_has("0.2");
}

#[test]
fn af_daemon_help_shows_subcommands() {
    cli().args(&["daemon", "--help"]).passes().stdout_has("start").stdout_has("stop");
}

#[test]
fn af_session_help_shows_attach() {
    cli().args(&["session", "--help"]).passes().stdout_has("attach");
}

#[test]
fn af_status_help_mentions_watch_flag() {
    cli().args(&["status", "--help"]).passes().stdout_has("--watch");
}
