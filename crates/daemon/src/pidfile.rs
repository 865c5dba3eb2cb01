// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! PID file lifecycle, letting `af daemon start/stop` detect an already
//! running kernel for the same project without racing the socket bind.

use std::path::Path;

use nix::sys::signal::kill;
use nix::unistd::Pid;

#[derive(Debug, thiserror::Error)]
pub enum PidFileError {
    #[error("a daemon is already running for this project (pid {0})")]
    AlreadyRunning(i32),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PID file contents are not a valid process id: {0:?}")]
    Corrupt(String),
}

impl PidFileError {
    pub fn code(&self) -> &'static str {
        match self {
            PidFileError::AlreadyRunning(_) => "daemon.already_running",
            PidFileError::Io(_) => "io",
            PidFileError::Corrupt(_) => "daemon.pidfile_corrupt",
        }
    }
}

/// Returns true if `pid` names a live process, via a signal-0 liveness
/// probe that delivers nothing but still validates existence/permission.
pub fn is_process_alive(pid: i32) -> bool {
    kill(Pid::from_raw(pid), None).is_ok()
}

/// Read the PID recorded at `path`, if any.
pub fn read_pid_file(path: &Path) -> Result<Option<i32>, PidFileError> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(path)?;
    let trimmed = contents.trim();
    trimmed.parse::<i32>().map(Some).map_err(|_| PidFileError::Corrupt(trimmed.to_string()))
}

/// Check for a live daemon, removing a stale PID file naming a dead
/// process. Returns `Err(AlreadyRunning)` if one is live.
pub fn check_daemon_running(path: &Path) -> Result<(), PidFileError> {
    match read_pid_file(path)? {
        Some(pid) if is_process_alive(pid) => Err(PidFileError::AlreadyRunning(pid)),
        Some(_) => {
            remove_pid_file(path)?;
            Ok(())
        }
        None => Ok(()),
    }
}

/// Write the current process id to `path`, truncating any prior content.
pub fn write_pid_file(path: &Path) -> Result<(), PidFileError> {
    std::fs::write(path, std::process::id().to_string())?;
    Ok(())
}

/// Remove the PID file if present; absence is not an error.
pub fn remove_pid_file(path: &Path) -> Result<(), PidFileError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[path = "pidfile_tests.rs"]
mod tests;
