// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! af: the aetherflow CLI. A thin client of the daemon's RPC surface;
//! every subcommand either starts/stops `aetherd` or opens one
//! connection to its Unix socket, sends one request, and renders the
//! response.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod client;
mod color;
mod commands;
mod exit_error;
mod output;

use std::path::PathBuf;
use std::time::Duration;

use aether_core::Role;
use aether_daemon::{CliOverrides, Config};
use clap::{Parser, Subcommand};

use client::RpcClient;
use exit_error::ExitError;
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "af", version, about = "aetherflow: a persistent agent-work supervisor", styles = color::styles())]
struct Cli {
    /// Project directory; defaults to the current directory.
    #[arg(long, global = true)]
    project_dir: Option<PathBuf>,

    /// Project name; defaults to the project directory's name or the
    /// `aetherflow.yaml` `project` field.
    #[arg(long, global = true)]
    project: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start or stop the project's aetherd kernel.
    Daemon {
        #[command(subcommand)]
        action: DaemonAction,
    },
    /// Pool and per-agent status.
    Status {
        agent: Option<String>,
        #[arg(short = 'w', long = "watch")]
        watch: bool,
        #[arg(long, default_value = "2", value_parser = parse_secs)]
        interval: Duration,
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Tail buffered events for one agent.
    Logs {
        agent: String,
        #[arg(short = 'f', long = "follow")]
        follow: bool,
    },
    /// Stop admitting new agents; existing agents keep running.
    Drain,
    /// Stop scheduling and respawning agents entirely.
    Pause,
    /// Resume normal scheduling.
    Resume,
    /// Send SIGTERM to one running agent.
    Kill { agent: String },
    /// Asset installation (not implemented in this release).
    Install,
    /// Spawn a freeform agent with no tracker-backed task.
    Spawn {
        prompt: String,
        #[arg(long, default_value = "worker")]
        role: String,
    },
    /// List known sessions for this project.
    Sessions {
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Attach to one session's event tail.
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
    /// Repeating text-mode status dashboard.
    Tui,
}

#[derive(Subcommand)]
enum DaemonAction {
    /// Start aetherd for this project.
    Start {
        #[arg(long)]
        foreground: bool,
    },
    /// Stop aetherd for this project.
    Stop,
}

#[derive(Subcommand)]
enum SessionAction {
    /// Follow one session's event tail.
    Attach {
        session_id: String,
        #[arg(short = 'f', long = "follow")]
        follow: bool,
    },
}

fn parse_secs(s: &str) -> Result<Duration, String> {
    s.parse::<u64>().map(Duration::from_secs).map_err(|e| e.to_string())
}

fn parse_role(s: &str) -> Result<Role, ExitError> {
    match s {
        "worker" => Ok(Role::Worker),
        "planner" => Ok(Role::Planner),
        other => Err(ExitError::new(2, format!("invalid --role {other:?}: expected \"worker\" or \"planner\""))),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(e.code);
    }
}

async fn run(cli: Cli) -> Result<(), ExitError> {
    let project_dir = cli.project_dir.unwrap_or(std::env::current_dir().map_err(|e| ExitError::new(1, e.to_string()))?);
    let file = Config::load_file(&project_dir).map_err(|e| ExitError::new(2, e.to_string()))?;
    let overrides = CliOverrides { project: cli.project, ..Default::default() };
    let config = Config::resolve(&project_dir, overrides, file).map_err(|e| ExitError::new(2, e.to_string()))?;

    match cli.command {
        Commands::Daemon { action } => match action {
            DaemonAction::Start { foreground } => commands::daemon::start(&config, foreground).await,
            DaemonAction::Stop => commands::daemon::stop(&config, &rpc_client(&config)).await,
        },
        Commands::Status { agent, watch, interval, format } => {
            commands::status::status(&rpc_client(&config), agent, watch, interval, format).await
        }
        Commands::Logs { agent, follow } => commands::status::logs(&rpc_client(&config), &agent, follow).await,
        Commands::Drain => commands::pool::drain(&rpc_client(&config), OutputFormat::Text).await,
        Commands::Pause => commands::pool::pause(&rpc_client(&config), OutputFormat::Text).await,
        Commands::Resume => commands::pool::resume(&rpc_client(&config), OutputFormat::Text).await,
        Commands::Kill { agent } => commands::status::kill(&rpc_client(&config), &agent).await,
        Commands::Install => {
            commands::install::install();
            Ok(())
        }
        Commands::Spawn { prompt, role } => commands::spawn::spawn(&rpc_client(&config), &prompt, parse_role(&role)?).await,
        Commands::Sessions { format } => commands::session::sessions(&config.project, format).await,
        Commands::Session { action } => match action {
            SessionAction::Attach { session_id, follow } => {
                commands::session::attach(&rpc_client(&config), &session_id, follow).await
            }
        },
        Commands::Tui => commands::tui::tui(&rpc_client(&config)).await,
    }
}

fn rpc_client(config: &Config) -> RpcClient {
    let socket_path = aether_daemon::env::socket_override().unwrap_or_else(|| config.socket_path());
    RpcClient::new(socket_path)
}
