// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! aetherd: the aetherflow kernel binary.
//!
//! One instance per project. Binds a project-scoped Unix socket, starts
//! the embedded runtime subprocess and the agent pool, then blocks
//! until SIGINT, SIGTERM, or an RPC-initiated `shutdown` arrives.
//! Normally launched by the `af` CLI; not meant to be run by hand.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use std::path::PathBuf;

use aether_daemon::orchestrator::{self, OrchestratorError};
use aether_daemon::pidfile::PidFileError;
use aether_daemon::{CliOverrides, Config, ConfigFile};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" => {
                println!("aetherd {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            other if !other.starts_with('-') => {}
            other => {
                eprintln!("error: unexpected argument '{other}'");
                print_usage();
                std::process::exit(1);
            }
        }
    }

    let project_dir = project_dir_arg().unwrap_or_else(|| std::env::current_dir().expect("cwd"));
    let file = Config::load_file(&project_dir)?;
    let config = Config::resolve(&project_dir, CliOverrides::default(), file)?;

    setup_logging();
    tracing::info!(project = %config.project, project_dir = %project_dir.display(), "starting aetherd");

    match orchestrator::run(config).await {
        Ok(()) => Ok(()),
        Err(OrchestratorError::PidFile(PidFileError::AlreadyRunning(pid))) => {
            eprintln!("aetherd is already running for this project (pid {pid})");
            std::process::exit(1);
        }
        Err(e) => {
            tracing::error!(error = %e, "aetherd exited with an error");
            Err(e.into())
        }
    }
}

fn project_dir_arg() -> Option<PathBuf> {
    std::env::args().nth(1).filter(|a| !a.starts_with('-')).map(PathBuf::from)
}

fn setup_logging() {
    let filter = EnvFilter::try_new(aether_daemon::env::log_filter()).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn print_usage() {
    println!("aetherd {}", env!("CARGO_PKG_VERSION"));
    println!("aetherflow kernel — background supervisor for one project's agent pool");
    println!();
    println!("USAGE:");
    println!("    aetherd [PROJECT_DIR]");
    println!();
    println!("The daemon is normally started by the `af` CLI and should not be run");
    println!("directly. It listens on a project-scoped Unix socket for commands.");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Print help information");
    println!("    -V, --version    Print version information");
}
