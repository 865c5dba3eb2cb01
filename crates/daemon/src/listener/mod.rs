// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! RPC listener: binds the project-scoped Unix socket, accepts
//! connections, and dispatches each request on its own spawned task,
//! matching the teacher's `listener::handle_connection` shape but with
//! NDJSON framing in place of its length-prefixed binary wire.

mod dispatch;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use aether_core::Clock;
use aether_wire::{read_request, write_response, ProtocolError, Response};
use tokio::io::BufReader;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Notify;
use tracing::{debug, error, warn};

use crate::event_buffer::EventBuffer;
use crate::pool::Pool;
use crate::session_registry::SessionRegistry;
use crate::tracker::Tracker;

#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    #[error("failed to remove stale socket {0}: {1}")]
    StaleSocket(PathBuf, std::io::Error),
    #[error("failed to bind socket {0}: {1}")]
    Bind(PathBuf, std::io::Error),
    #[error("failed to set socket permissions on {0}: {1}")]
    Permissions(PathBuf, std::io::Error),
}

/// Shared context every RPC handler needs, generic over the pool's
/// [`Clock`] so production and test kernels share the same dispatch code.
pub struct ListenCtx<C: Clock> {
    pub pool: Arc<Pool<C>>,
    pub buffer: Arc<EventBuffer>,
    pub tracker: Arc<Tracker>,
    pub registry: Arc<SessionRegistry>,
    pub project: String,
    pub socket_path: PathBuf,
    pub ipc_timeout: Duration,
    pub clock: C,
    pub shutdown: Arc<Notify>,
}

/// Bind the project's socket, removing a stale file left by an unclean
/// prior exit and restricting access to the owner.
pub fn bind_socket(path: &Path) -> Result<UnixListener, ListenerError> {
    if path.exists() {
        std::fs::remove_file(path).map_err(|e| ListenerError::StaleSocket(path.to_path_buf(), e))?;
    }
    let listener = UnixListener::bind(path).map_err(|e| ListenerError::Bind(path.to_path_buf(), e))?;
    set_owner_only(path)?;
    Ok(listener)
}

#[cfg(unix)]
fn set_owner_only(path: &Path) -> Result<(), ListenerError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))
        .map_err(|e| ListenerError::Permissions(path.to_path_buf(), e))
}

pub struct Listener<C: Clock> {
    unix: UnixListener,
    ctx: Arc<ListenCtx<C>>,
}

impl<C: Clock + 'static> Listener<C> {
    pub fn new(unix: UnixListener, ctx: Arc<ListenCtx<C>>) -> Self {
        Self { unix, ctx }
    }

    /// Accept connections until `shutdown` resolves, spawning one task per
    /// connection so a slow client never blocks the accept loop.
    pub async fn run(self, mut shutdown: tokio::sync::oneshot::Receiver<()>) {
        loop {
            tokio::select! {
                result = self.unix.accept() => {
                    match result {
                        Ok((stream, _)) => {
                            let ctx = self.ctx.clone();
                            tokio::spawn(async move {
                                if let Err(e) = handle_connection(stream, &ctx).await {
                                    log_connection_error(e);
                                }
                            });
                        }
                        Err(e) => error!(error = %e, "accept failed"),
                    }
                }
                _ = &mut shutdown => {
                    debug!("listener stopping");
                    return;
                }
            }
        }
    }
}

fn log_connection_error(e: ProtocolError) {
    match e {
        ProtocolError::Eof => debug!("client disconnected"),
        ProtocolError::Timeout(_) => warn!("connection timed out waiting for a request"),
        other => error!(error = %other, "connection error"),
    }
}

/// Serve one client connection: read requests until EOF or the read
/// deadline elapses. A malformed request gets a `Response::err` without
/// closing the connection, per the RPC contract.
async fn handle_connection<C: Clock + 'static>(stream: UnixStream, ctx: &ListenCtx<C>) -> Result<(), ProtocolError> {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    loop {
        let request = match read_request(&mut reader, ctx.ipc_timeout).await {
            Ok(request) => request,
            Err(ProtocolError::Json(e)) => {
                warn!(error = %e, "malformed rpc request");
                write_response(&mut write_half, &Response::err(format!("malformed request: {e}"))).await?;
                continue;
            }
            Err(e) => return Err(e),
        };

        let response = dispatch::dispatch(ctx, request).await;
        write_response(&mut write_half, &response).await?;
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
