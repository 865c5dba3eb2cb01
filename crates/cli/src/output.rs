// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use aether_wire::{PoolModeResult, StatusFullResult, StatusResult};
use clap::ValueEnum;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_status(result: &StatusResult, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(result),
        OutputFormat::Text => {
            println!(
                "{}  {}/{} agents running  {}",
                crate::color::header(&result.mode.to_string()),
                result.running,
                result.pool_size,
                crate::color::muted(&result.socket_path),
            );
            Ok(())
        }
    }
}

pub fn print_status_full(result: &StatusFullResult, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(result),
        OutputFormat::Text => {
            println!(
                "project {}  mode {}  {} agent(s), pool size {}",
                crate::color::literal(&result.project),
                crate::color::header(&result.mode.to_string()),
                result.agents.len(),
                result.pool_size,
            );
            for agent in &result.agents {
                println!(
                    "  {}  {:<8}  task {:<24}  pid {}",
                    agent.id,
                    agent.state.to_string(),
                    if agent.task_id.is_empty() { "-" } else { &agent.task_id },
                    agent.pid,
                );
            }
            if !result.errors.is_empty() {
                println!();
                println!("{}:", crate::color::muted("partial errors"));
                for e in &result.errors {
                    println!("  - {e}");
                }
            }
            Ok(())
        }
    }
}

pub fn print_pool_mode(result: &PoolModeResult, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(result),
        OutputFormat::Text => {
            println!("mode is now {} ({} running)", crate::color::header(&result.mode.to_string()), result.running);
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
