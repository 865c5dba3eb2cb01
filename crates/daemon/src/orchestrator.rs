// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Top-level wiring: resolves configuration, starts every component in
//! dependency order, and drives the shutdown sequence. One root
//! `tokio_util::sync::CancellationToken` is the kernel's cancellation
//! scope, matching the teacher's listener/engine shutdown race, fanned
//! out to each component's oneshot-based `run`/`supervise` signature.

use std::sync::Arc;
use std::time::Duration;

use aether_core::{Clock, PoolMode, SystemClock};
use thiserror::Error;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::{Config, Policy};
use crate::env;
use crate::event_buffer::EventBuffer;
use crate::git::Git;
use crate::listener::{self, ListenCtx, Listener, ListenerError};
use crate::pidfile::{self, PidFileError};
use crate::poller::{Poller, PollerConfig};
use crate::pool::{Pool, PoolConfig};
use crate::process::{CommandRunner, ProcessStarter, TokioCommandRunner, UnixProcessStarter};
use crate::reconciler::{Reconciler, ReconcilerConfig};
use crate::runtime_client::RuntimeClient;
use crate::runtime_supervisor::{RuntimeSupervisor, RuntimeSupervisorConfig, SupervisorError};
use crate::session_registry::{RegistryError, SessionRegistry};
use crate::tracker::Tracker;

/// How often the eviction loop checks for idle sessions/event rings. The
/// TTL itself (`idle_eviction_duration`, default 48h) is configured
/// separately — this is just the polling cadence.
const EVICTION_CHECK_INTERVAL: Duration = Duration::from_secs(900);

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    PidFile(#[from] PidFileError),
    #[error(transparent)]
    Listener(#[from] ListenerError),
    #[error(transparent)]
    Supervisor(#[from] SupervisorError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("failed to query tracker at startup: {0}")]
    TrackerUnavailable(String),
}

/// Derive the remote name a `git fetch` targets from `integration_ref`
/// (`origin/main` -> `origin`), since the kernel has no separate remote
/// configuration knob.
fn remote_from_integration_ref(integration_ref: &str) -> &str {
    integration_ref.split('/').next().unwrap_or("origin")
}

/// Bridges a `CancellationToken` into the `oneshot::Receiver<()>` every
/// component's `run`/`supervise` method expects.
fn on_cancel(token: CancellationToken) -> oneshot::Receiver<()> {
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        token.cancelled().await;
        let _ = tx.send(());
    });
    rx
}

/// Run the kernel to completion: blocks until a shutdown signal (SIGINT,
/// SIGTERM, or an RPC-initiated `shutdown`) is received, then drains and
/// tears down cleanly.
pub async fn run(config: Config) -> Result<(), OrchestratorError> {
    let pid_path = config.pid_path();
    pidfile::check_daemon_running(&pid_path)?;

    let socket_path = config.socket_path();
    let unix = listener::bind_socket(&socket_path)?;
    pidfile::write_pid_file(&pid_path)?;
    info!(project = %config.project, socket = %socket_path.display(), "socket bound");

    let result = run_with_socket(&config, unix, &socket_path).await;

    let _ = pidfile::remove_pid_file(&pid_path);
    if let Err(e) = std::fs::remove_file(&socket_path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(error = %e, "failed to remove socket file on shutdown");
        }
    }
    result
}

async fn run_with_socket(
    config: &Config,
    unix: tokio::net::UnixListener,
    socket_path: &std::path::Path,
) -> Result<(), OrchestratorError> {
    let runner: Arc<dyn CommandRunner> = Arc::new(TokioCommandRunner);
    let starter: Arc<dyn ProcessStarter> = Arc::new(UnixProcessStarter);
    let tracker = Arc::new(Tracker::new(runner.clone(), config.tracker_cmd.clone(), config.project_dir.clone()));
    let git = Git::new(runner, config.project_dir.clone());

    let supervisor = Arc::new(RuntimeSupervisor::new(
        starter.clone(),
        RuntimeSupervisorConfig::with_defaults(config.spawn_cmd.clone(), config.project_dir.clone(), socket_path.to_path_buf()),
    )?);
    info!(port = supervisor.port(), "starting runtime subprocess");
    supervisor.start().await?;

    let pool_config = PoolConfig {
        pool_size: config.pool_size,
        spawn_cmd: config.spawn_cmd.clone(),
        runtime_url: supervisor.base_url().to_string(),
        project_dir: config.project_dir.clone(),
        max_retries: config.max_retries,
    };
    let socket_path_owned = socket_path.to_path_buf();
    let pool = Arc::new(Pool::new(pool_config, starter, tracker.clone(), SystemClock, move |agent_id: &str| {
        env::agent_env(&socket_path_owned, agent_id)
    }));

    let buffer = Arc::new(EventBuffer::new(config.ring_capacity));
    let registry = Arc::new(SessionRegistry::load(SessionRegistry::default_path(&config.project))?);

    match tracker.in_progress(&config.project).await {
        Ok(in_progress) => {
            let reclaimed = pool.reclaim(in_progress).await;
            info!(reclaimed, "startup reclaim complete");
        }
        Err(e) => warn!(error = %e, "failed to query in-progress tasks for startup reclaim"),
    }

    let runtime_client = RuntimeClient::new(supervisor.base_url());
    reconcile_sessions(&registry, &buffer, &runtime_client, &config.project).await;

    let eviction_buffer = buffer.clone();
    let eviction_registry = registry.clone();

    let root = CancellationToken::new();
    let shutdown_notify = Arc::new(tokio::sync::Notify::new());
    {
        let token = root.clone();
        let notify = shutdown_notify.clone();
        tokio::spawn(async move {
            notify.notified().await;
            info!("rpc-initiated shutdown, cancelling kernel scope");
            token.cancel();
        });
    }

    let ctx = Arc::new(ListenCtx {
        pool: pool.clone(),
        buffer,
        tracker: tracker.clone(),
        registry,
        project: config.project.clone(),
        socket_path: socket_path.to_path_buf(),
        ipc_timeout: config.ipc_timeout,
        clock: SystemClock,
        shutdown: shutdown_notify,
    });
    let listener_task = tokio::spawn(Listener::new(unix, ctx).run(on_cancel(root.clone())));

    let supervisor_task = {
        let supervisor = supervisor.clone();
        tokio::spawn(async move { supervisor.supervise(on_cancel(root.clone())).await })
    };

    let poller_task = (config.policy == Policy::Auto).then(|| {
        let poller = Poller::new(pool.clone(), tracker.clone(), PollerConfig { project: config.project.clone(), interval: config.poll_interval });
        let shutdown = on_cancel(root.clone());
        tokio::spawn(async move { poller.run(shutdown).await })
    });

    let reconciler_task = (!config.solo_mode).then(|| {
        let reconciler = Reconciler::new(
            git,
            Tracker::new(Arc::new(TokioCommandRunner), config.tracker_cmd.clone(), config.project_dir.clone()),
            ReconcilerConfig {
                project: config.project.clone(),
                interval: config.reconcile_interval,
                remote: remote_from_integration_ref(&config.integration_ref).to_string(),
                integration_ref: config.integration_ref.clone(),
                branch_prefix: config.branch_prefix.clone(),
            },
        );
        let shutdown = on_cancel(root.clone());
        tokio::spawn(async move { reconciler.run(shutdown).await })
    });

    let eviction_task = {
        let project = config.project.clone();
        let ttl = config.idle_eviction_duration;
        let shutdown = on_cancel(root.clone());
        tokio::spawn(async move { run_eviction_loop(eviction_buffer, eviction_registry, project, ttl, shutdown).await })
    };

    wait_for_shutdown(&root).await;
    root.cancel();

    shutdown_pool(&pool, config.drain_timeout).await;
    supervisor.terminate();

    for task in [Some(listener_task), Some(supervisor_task), poller_task, reconciler_task, Some(eviction_task)].into_iter().flatten() {
        task.abort();
    }

    info!("shutdown complete");
    Ok(())
}

/// Reconcile the persistent session registry against the runtime's own
/// session list at startup: drop entries for sessions the runtime no
/// longer knows about, then backfill the Event Buffer for sessions that
/// survived but have no in-memory ring yet (they predate this daemon
/// instance, e.g. after a restart).
async fn reconcile_sessions(registry: &SessionRegistry, buffer: &EventBuffer, client: &RuntimeClient, project: &str) {
    let sessions = match client.list_sessions().await {
        Ok(sessions) => sessions,
        Err(e) => {
            warn!(error = %e, "failed to list runtime sessions for startup reconciliation");
            return;
        }
    };
    let live_ids: Vec<String> = sessions.iter().map(|s| s.id.clone()).collect();
    match registry.prune_missing(project, &live_ids) {
        Ok(pruned) if pruned > 0 => info!(pruned, "pruned stale session registry entries at startup"),
        Ok(_) => {}
        Err(e) => warn!(error = %e, "failed to prune session registry at startup"),
    }

    for record in registry.for_project(project) {
        if buffer.contains(&record.session_id) {
            continue;
        }
        backfill_session(buffer, client, &record).await;
    }
}

/// Replay a session's full message history into the Event Buffer so
/// `af logs`/`af status <agent>` have something to show before any new
/// event arrives live.
async fn backfill_session(buffer: &EventBuffer, client: &RuntimeClient, record: &aether_core::SessionRecord) {
    let messages = match client.get_messages(&record.session_id).await {
        Ok(messages) => messages,
        Err(e) => {
            warn!(session_id = %record.session_id, error = %e, "failed to backfill session messages");
            return;
        }
    };
    let count = messages.len();
    for message in messages {
        let timestamp_ms = message
            .get("time")
            .and_then(|t| t.get("created"))
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(record.last_seen_at_ms);
        let event = aether_core::Event {
            session_id: record.session_id.clone(),
            event_type: aether_core::event::event_type::MESSAGE_UPDATED.to_string(),
            timestamp_ms,
            data: message,
        };
        buffer.ingest(event, timestamp_ms);
    }
    debug!(session_id = %record.session_id, count, "backfilled session from runtime");
}

/// Periodically evict event-buffer rings and registry entries idle past
/// `ttl`, so neither grows without bound across a long-lived daemon.
async fn run_eviction_loop(
    buffer: Arc<EventBuffer>,
    registry: Arc<SessionRegistry>,
    project: String,
    ttl: Duration,
    mut shutdown: oneshot::Receiver<()>,
) {
    let ttl_ms = ttl.as_millis() as u64;
    let mut ticker = tokio::time::interval(EVICTION_CHECK_INTERVAL);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now_ms = SystemClock.epoch_ms();
                let evicted_rings = buffer.evict_idle(now_ms, ttl_ms);
                if evicted_rings > 0 {
                    info!(evicted_rings, "evicted idle event buffer rings");
                }
                match registry.evict_idle(now_ms, ttl_ms) {
                    Ok(evicted) if evicted > 0 => info!(evicted, project = %project, "evicted idle session registry entries"),
                    Ok(_) => {}
                    Err(e) => warn!(error = %e, "failed to evict idle session registry entries"),
                }
            }
            _ = &mut shutdown => {
                debug!("eviction loop stopping");
                return;
            }
        }
    }
}

async fn wait_for_shutdown(root: &CancellationToken) {
    loop {
        tokio::select! {
            _ = crate::shutdown::wait_for_shutdown_signal() => return,
            _ = crate::shutdown::wait_for_reload_signal() => {
                info!("config reload is not supported in this release, ignoring SIGHUP");
            }
            _ = root.cancelled() => return,
        }
    }
}

/// Stop admitting new work, wait up to `drain_timeout` for running agents
/// to exit on their own, then signal any stragglers directly.
async fn shutdown_pool(pool: &Arc<Pool<SystemClock>>, drain_timeout: Duration) {
    pool.set_mode(PoolMode::ShuttingDown);
    let deadline = tokio::time::Instant::now() + drain_timeout;
    while pool.running_count() > 0 && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    let remaining = pool.status().agents;
    if remaining.is_empty() {
        return;
    }
    warn!(count = remaining.len(), "drain timeout elapsed, signaling remaining agents");
    for agent in remaining {
        if let Err(e) = pool.kill(&agent.id).await {
            error!(agent = %agent.id, error = %e, "failed to signal agent during shutdown");
        }
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
