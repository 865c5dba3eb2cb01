//! Argument validation: missing/invalid arguments exit 2, matching the
//! documented CLI exit code contract (0 success, 1 RPC failure, 2
//! invalid arguments).

use crate::prelude::*;

#[test]
fn spawn_without_a_prompt_is_an_invalid_argument() {
    let result = cli().args(&["spawn"]).fails();
    assert_eq!(result.code(), Some(2));
}

#[test]
fn kill_without_an_agent_id_is_an_invalid_argument() {
    let result = cli().args(&["kill"]).fails();
    assert_eq!(result.code(), Some(2));
}

#[test]
fn spawn_rejects_an_unknown_role() {
    let project = Project::empty();
    let result = project.af().args(&["--project", "role-test", "spawn", "do it", "--role", "bogus"]).fails();
    assert_eq!(result.code(), Some(2));
    result.stderr_has("invalid --role");
}

#[test]
fn unknown_subcommand_is_an_invalid_argument() {
    let result = cli().args(&["bogus-command"]).fails();
    assert_eq!(result.code(), Some(2));
}
