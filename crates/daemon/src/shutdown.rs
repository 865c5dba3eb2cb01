// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Waits for an operator-driven or signal-driven shutdown request, racing
//! Ctrl-C against SIGTERM the way a long-running Unix daemon should.

use tokio::signal::unix::{signal, SignalKind};
use tracing::info;

/// Resolves once SIGINT or SIGTERM is received. Installing the SIGTERM
/// handler can only fail if the signal set-up itself fails (not if the
/// signal never arrives), which is a startup-time condition worth
/// terminating on rather than silently ignoring.
pub async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}

/// SIGHUP triggers an optional config reload rather than shutdown; callers
/// `tokio::select!` this alongside [`wait_for_shutdown_signal`].
pub async fn wait_for_reload_signal() {
    match signal(SignalKind::hangup()) {
        Ok(mut sig) => {
            sig.recv().await;
            info!("received SIGHUP, reload requested");
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to install SIGHUP handler");
            std::future::pending::<()>().await;
        }
    }
}
