// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Owns the single AI-runtime server subprocess a kernel supervises:
//! binds a free port, starts `<runtime> serve`, probes health until
//! ready, and restarts on crash with backoff.

use std::net::TcpListener;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::{debug, error, info, warn};

use crate::process::{ProcessHandle, ProcessStarter};
use crate::runtime_client::RuntimeClient;

const HEALTH_POLL_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Debug, thiserror::Error)]
pub enum SupervisorError {
    #[error("failed to bind a free port: {0}")]
    PortBind(#[source] std::io::Error),
    #[error("failed to start runtime subprocess: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("runtime did not become healthy within {0:?}")]
    HealthTimeout(Duration),
}

impl SupervisorError {
    pub fn code(&self) -> &'static str {
        match self {
            SupervisorError::PortBind(_) => "runtime.port_bind_failed",
            SupervisorError::Spawn(_) => "runtime.spawn_failed",
            SupervisorError::HealthTimeout(_) => "runtime.health_timeout",
        }
    }
}

pub struct RuntimeSupervisorConfig {
    pub runtime_cmd: String,
    pub project_dir: PathBuf,
    pub socket_path: PathBuf,
    pub preferred_port: Option<u16>,
    pub health_wait: Duration,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl RuntimeSupervisorConfig {
    pub fn with_defaults(runtime_cmd: impl Into<String>, project_dir: impl Into<PathBuf>, socket_path: impl Into<PathBuf>) -> Self {
        Self {
            runtime_cmd: runtime_cmd.into(),
            project_dir: project_dir.into(),
            socket_path: socket_path.into(),
            preferred_port: None,
            health_wait: Duration::from_secs(30),
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
        }
    }
}

pub struct RuntimeSupervisor {
    starter: Arc<dyn ProcessStarter>,
    config: RuntimeSupervisorConfig,
    port: u16,
    base_url: String,
    handle: RwLock<Option<Box<dyn ProcessHandle>>>,
}

impl RuntimeSupervisor {
    /// Bind a free port (or validate the preferred one is free) before the
    /// runtime subprocess is ever started, so `base_url` is known up front.
    pub fn new(starter: Arc<dyn ProcessStarter>, config: RuntimeSupervisorConfig) -> Result<Self, SupervisorError> {
        let port = Self::reserve_port(config.preferred_port)?;
        let base_url = format!("http://127.0.0.1:{port}");
        Ok(Self { starter, config, port, base_url, handle: RwLock::new(None) })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    fn reserve_port(preferred: Option<u16>) -> Result<u16, SupervisorError> {
        let addr = format!("127.0.0.1:{}", preferred.unwrap_or(0));
        let listener = TcpListener::bind(&addr).map_err(SupervisorError::PortBind)?;
        let port = listener.local_addr().map_err(SupervisorError::PortBind)?.port();
        drop(listener);
        Ok(port)
    }

    /// Start the runtime subprocess and block until it reports healthy,
    /// or `health_wait` elapses.
    pub async fn start(&self) -> Result<(), SupervisorError> {
        let child = self.spawn_child().await?;
        *self.handle.write() = Some(child);
        self.wait_healthy().await
    }

    async fn spawn_child(&self) -> Result<Box<dyn ProcessHandle>, SupervisorError> {
        let args = vec!["serve".to_string(), "--port".to_string(), self.port.to_string()];
        let env = vec![
            ("AETHERFLOW_SOCKET".to_string(), self.config.socket_path.to_string_lossy().into_owned()),
            ("AETHERFLOW_AGENT_ID".to_string(), "_server".to_string()),
        ];
        self.starter
            .start(&self.config.project_dir, &self.config.runtime_cmd, &args, &env)
            .await
            .map_err(SupervisorError::Spawn)
    }

    async fn wait_healthy(&self) -> Result<(), SupervisorError> {
        let client = RuntimeClient::new(&self.base_url);
        let deadline = tokio::time::Instant::now() + self.config.health_wait;
        loop {
            if let Ok(true) = client.health().await {
                info!(port = self.port, "runtime healthy");
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(SupervisorError::HealthTimeout(self.config.health_wait));
            }
            tokio::time::sleep(HEALTH_POLL_INTERVAL).await;
        }
    }

    /// Supervise the subprocess until `shutdown` resolves: on crash,
    /// restart with exponential backoff up to `config.max_backoff`, resetting the
    /// backoff once the runtime stays healthy again. Returns once asked to
    /// shut down, after terminating the subprocess.
    pub async fn supervise(&self, mut shutdown: tokio::sync::oneshot::Receiver<()>) {
        let mut backoff = self.config.initial_backoff;
        loop {
            let Some(mut running) = self.handle.write().take() else {
                return;
            };

            tokio::select! {
                exit = running.wait() => {
                    match exit {
                        Ok(status) => warn!(?status, "runtime subprocess exited, restarting"),
                        Err(e) => error!(error = %e, "failed to wait on runtime subprocess"),
                    }
                }
                _ = &mut shutdown => {
                    Self::terminate_handle(running.as_ref());
                    return;
                }
            }

            // Retry the restart with backoff until it succeeds or shutdown
            // fires; a spawn failure here must not silently end supervision.
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(backoff) => {}
                    _ = &mut shutdown => { return; }
                }
                match self.spawn_child().await {
                    Ok(child) => {
                        *self.handle.write() = Some(child);
                        if self.wait_healthy().await.is_ok() {
                            backoff = self.config.initial_backoff;
                        } else {
                            backoff = (backoff * 2).min(self.config.max_backoff);
                        }
                        break;
                    }
                    Err(e) => {
                        error!(error = %e, "failed to restart runtime subprocess");
                        backoff = (backoff * 2).min(self.config.max_backoff);
                    }
                }
            }
        }
    }

    /// Send SIGTERM to the runtime subprocess, if one is currently owned
    /// by this supervisor (i.e. not mid-restart inside `supervise`).
    pub fn terminate(&self) {
        if let Some(handle) = self.handle.read().as_ref() {
            Self::terminate_handle(handle.as_ref());
        }
    }

    fn terminate_handle(handle: &dyn ProcessHandle) {
        debug!(pid = handle.pid(), "terminating runtime subprocess");
        if let Err(e) = handle.signal(nix::sys::signal::Signal::SIGTERM) {
            warn!(error = %e, "failed to signal runtime subprocess");
        }
    }
}

#[cfg(test)]
#[path = "runtime_supervisor_tests.rs"]
mod tests;
