// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `af daemon start/stop` - spawn and stop the project's `aetherd` kernel.

use aether_daemon::pidfile;
use aether_daemon::Config;
use serde_json::json;

use crate::client::RpcClient;
use crate::exit_error::ExitError;

pub async fn start(config: &Config, foreground: bool) -> Result<(), ExitError> {
    if pidfile::check_daemon_running(&config.pid_path()).is_err() {
        println!("aetherd is already running for project {:?}", config.project);
        return Ok(());
    }

    let exe = std::env::current_exe().ok().and_then(|p| p.parent().map(|d| d.join("aetherd"))).unwrap_or_else(|| "aetherd".into());

    let mut command = std::process::Command::new(&exe);
    command.arg(&config.project_dir);

    if foreground {
        let status = command.status().map_err(|e| ExitError::new(1, format!("failed to run aetherd: {e}")))?;
        if !status.success() {
            return Err(ExitError::new(1, "aetherd exited with a non-zero status".to_string()));
        }
        return Ok(());
    }

    command.stdin(std::process::Stdio::null()).stdout(std::process::Stdio::null()).stderr(std::process::Stdio::null());
    command.spawn().map_err(|e| ExitError::new(1, format!("failed to start aetherd: {e}")))?;
    println!("aetherd started for project {:?}", config.project);
    Ok(())
}

pub async fn stop(config: &Config, client: &RpcClient) -> Result<(), ExitError> {
    match client.call(aether_wire::method::SHUTDOWN, json!({})).await {
        Ok(_) => {
            println!("aetherd is shutting down");
            Ok(())
        }
        Err(e) => {
            // The daemon may already be gone; fall back to the PID file so
            // `af daemon stop` still succeeds against a stuck process.
            match pidfile::read_pid_file(&config.pid_path()) {
                Ok(Some(pid)) if pidfile::is_process_alive(pid) => {
                    let _ = nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid), nix::sys::signal::Signal::SIGTERM);
                    println!("sent SIGTERM to aetherd (pid {pid})");
                    Ok(())
                }
                _ => Err(ExitError::new(e.exit_code(), format!("could not stop aetherd: {e}"))),
            }
        }
    }
}
