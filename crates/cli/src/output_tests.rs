// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use aether_core::PoolMode;
use aether_wire::StatusResult;

use super::*;

#[test]
fn print_status_text_does_not_error() {
    let result = StatusResult { running: 2, pool_size: 4, mode: PoolMode::Active, socket_path: "/tmp/aetherd-demo.sock".to_string() };
    print_status(&result, OutputFormat::Text).unwrap();
}

#[test]
fn print_status_json_does_not_error() {
    let result = StatusResult { running: 2, pool_size: 4, mode: PoolMode::Active, socket_path: "/tmp/aetherd-demo.sock".to_string() };
    print_status(&result, OutputFormat::Json).unwrap();
}
