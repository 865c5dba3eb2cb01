// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Kernel configuration: CLI flags > `aetherflow.yaml` in the project
//! directory > built-in defaults, validated once before any I/O.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

const PROJECT_NAME_PATTERN: &str = r"^[A-Za-z0-9][A-Za-z0-9._-]*$";

/// Scheduling policy for the Poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    /// Poller is not started; only orphan reclaim runs at startup.
    Manual,
    Auto,
}

impl Default for Policy {
    fn default() -> Self {
        Policy::Manual
    }
}

/// On-disk form of the config, as parsed from `aetherflow.yaml`. Every
/// field is optional so a partial file only overrides what it names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub project: Option<String>,
    pub pool_size: Option<usize>,
    pub policy: Option<Policy>,
    pub poll_interval_ms: Option<u64>,
    pub reconcile_interval_ms: Option<u64>,
    pub ipc_timeout_ms: Option<u64>,
    pub idle_eviction_hours: Option<u64>,
    pub ring_capacity: Option<usize>,
    pub max_retries: Option<u32>,
    pub runtime_port: Option<u16>,
    pub spawn_cmd: Option<String>,
    pub tracker_cmd: Option<String>,
    pub solo_mode: Option<bool>,
    pub drain_timeout_ms: Option<u64>,
    pub branch_prefix: Option<String>,
    pub integration_ref: Option<String>,
}

/// Resolved, validated kernel configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub project: String,
    pub project_dir: PathBuf,
    pub pool_size: usize,
    pub policy: Policy,
    pub poll_interval: Duration,
    pub reconcile_interval: Duration,
    pub ipc_timeout: Duration,
    pub idle_eviction_duration: Duration,
    pub ring_capacity: usize,
    pub max_retries: u32,
    pub runtime_port: u16,
    pub spawn_cmd: String,
    pub tracker_cmd: String,
    pub solo_mode: bool,
    pub drain_timeout: Duration,
    pub branch_prefix: String,
    pub integration_ref: String,
}

/// Overrides supplied on the command line; `None` means "use the YAML
/// file or default for this field."
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub project: Option<String>,
    pub pool_size: Option<usize>,
    pub policy: Option<Policy>,
    pub socket_path: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid project name {0:?}: must match {PROJECT_NAME_PATTERN}")]
    InvalidProjectName(String),
    #[error("pool_size must be at least 1, got {0}")]
    PoolSizeZero(usize),
    #[error("poll_interval must be positive, got {0:?}")]
    NonPositivePollInterval(Duration),
    #[error("reconcile_interval must be at least 5s, got {0:?}")]
    ReconcileIntervalTooShort(Duration),
    #[error("failed to read config file {path}: {source}")]
    Read { path: PathBuf, #[source] source: std::io::Error },
    #[error("failed to parse config file {path}: {source}")]
    Parse { path: PathBuf, #[source] source: serde_yaml::Error },
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::InvalidProjectName(_) => "project.invalid_name",
            ConfigError::PoolSizeZero(_) => "config.invalid",
            ConfigError::NonPositivePollInterval(_) => "config.invalid",
            ConfigError::ReconcileIntervalTooShort(_) => "config.invalid",
            ConfigError::Read { .. } => "config.read_failed",
            ConfigError::Parse { .. } => "config.parse_failed",
        }
    }
}

impl Config {
    /// Resolve a config from CLI overrides plus an optional YAML file,
    /// defaulting whatever neither names, then validate the result.
    pub fn resolve(
        project_dir: &Path,
        overrides: CliOverrides,
        file: ConfigFile,
    ) -> Result<Config, ConfigError> {
        let project = overrides
            .project
            .or(file.project)
            .unwrap_or_else(|| default_project_name(project_dir));

        let config = Config {
            project,
            project_dir: project_dir.to_path_buf(),
            pool_size: overrides.pool_size.or(file.pool_size).unwrap_or(4),
            policy: overrides.policy.or(file.policy).unwrap_or_default(),
            poll_interval: Duration::from_millis(file.poll_interval_ms.unwrap_or(10_000)),
            reconcile_interval: Duration::from_millis(
                file.reconcile_interval_ms.unwrap_or(30_000),
            ),
            ipc_timeout: Duration::from_millis(file.ipc_timeout_ms.unwrap_or(5_000)),
            idle_eviction_duration: Duration::from_secs(
                file.idle_eviction_hours.unwrap_or(48) * 3600,
            ),
            ring_capacity: file.ring_capacity.unwrap_or(10_000),
            max_retries: file.max_retries.unwrap_or(2),
            runtime_port: file.runtime_port.unwrap_or(4096),
            spawn_cmd: file.spawn_cmd.unwrap_or_else(|| "opencode".to_string()),
            tracker_cmd: file.tracker_cmd.unwrap_or_else(|| "prog".to_string()),
            solo_mode: file.solo_mode.unwrap_or(false),
            drain_timeout: Duration::from_millis(file.drain_timeout_ms.unwrap_or(5_000)),
            branch_prefix: file.branch_prefix.unwrap_or_else(|| "af".to_string()),
            integration_ref: file.integration_ref.unwrap_or_else(|| "origin/main".to_string()),
        };
        config.validate()?;
        Ok(config)
    }

    /// Load `aetherflow.yaml` from `project_dir` if present; an absent file
    /// is not an error (defaults apply).
    pub fn load_file(project_dir: &Path) -> Result<ConfigFile, ConfigError> {
        let path = project_dir.join("aetherflow.yaml");
        if !path.exists() {
            return Ok(ConfigFile::default());
        }
        let contents =
            std::fs::read_to_string(&path).map_err(|source| ConfigError::Read { path: path.clone(), source })?;
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse { path, source })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let re = aether_core::task::project_name_regex();
        if !re.is_match(&self.project) {
            return Err(ConfigError::InvalidProjectName(self.project.clone()));
        }
        if self.pool_size == 0 {
            return Err(ConfigError::PoolSizeZero(self.pool_size));
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::NonPositivePollInterval(self.poll_interval));
        }
        if self.reconcile_interval < Duration::from_secs(5) {
            return Err(ConfigError::ReconcileIntervalTooShort(self.reconcile_interval));
        }
        Ok(())
    }

    /// Socket path: `<tmp>/aetherd-<project>.sock`.
    pub fn socket_path(&self) -> PathBuf {
        std::env::temp_dir().join(format!("aetherd-{}.sock", self.project))
    }

    /// PID file path: `<tmp>/aetherd-<project>.pid`.
    pub fn pid_path(&self) -> PathBuf {
        std::env::temp_dir().join(format!("aetherd-{}.pid", self.project))
    }
}

fn default_project_name(project_dir: &Path) -> String {
    project_dir
        .file_name()
        .and_then(|n| n.to_str())
        .map(|s| s.to_string())
        .unwrap_or_else(|| "default".to_string())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
