// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Two narrow trait seams for everything the kernel does outside its own
//! process: running a short-lived external command to completion (the
//! task tracker, git plumbing) and starting a long-lived managed
//! subprocess (an agent). Production code delegates to `tokio::process`;
//! tests inject deterministic fakes implementing the same traits.
//!
//! Do not generalize beyond these two surfaces.

#[cfg(test)]
pub(crate) mod fake;

use std::path::Path;
use std::process::ExitStatus;

use async_trait::async_trait;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use std::os::unix::process::CommandExt as _;
use tokio::process::Command;

/// Output of a completed external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// Runs a short-lived external command to completion and captures its
/// output. Used for `prog` (task tracker) and `git` invocations.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, cwd: &Path, program: &str, args: &[String]) -> std::io::Result<CommandOutput>;
}

/// Delegates to `tokio::process::Command`.
pub struct TokioCommandRunner;

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    async fn run(&self, cwd: &Path, program: &str, args: &[String]) -> std::io::Result<CommandOutput> {
        let output = Command::new(program).args(args).current_dir(cwd).output().await?;
        Ok(CommandOutput {
            status: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// A handle to a started subprocess: can be waited on or signaled.
#[async_trait]
pub trait ProcessHandle: Send + Sync {
    fn pid(&self) -> u32;
    async fn wait(&mut self) -> std::io::Result<ExitStatus>;
    fn signal(&self, sig: Signal) -> std::io::Result<()>;
}

/// Starts a managed subprocess with inherited environment plus the given
/// extra variables, as its own session leader so terminal signals
/// delivered to the supervisor's process group do not reach it.
#[async_trait]
pub trait ProcessStarter: Send + Sync {
    async fn start(
        &self,
        cwd: &Path,
        program: &str,
        args: &[String],
        extra_env: &[(String, String)],
    ) -> std::io::Result<Box<dyn ProcessHandle>>;
}

pub struct TokioProcessHandle {
    child: tokio::process::Child,
    pid: u32,
}

#[async_trait]
impl ProcessHandle for TokioProcessHandle {
    fn pid(&self) -> u32 {
        self.pid
    }

    async fn wait(&mut self) -> std::io::Result<ExitStatus> {
        self.child.wait().await
    }

    fn signal(&self, sig: Signal) -> std::io::Result<()> {
        match signal::kill(Pid::from_raw(self.pid as i32), sig) {
            Ok(()) => Ok(()),
            Err(nix::errno::Errno::ESRCH) => Ok(()), // already exited
            Err(e) => Err(std::io::Error::from_raw_os_error(e as i32)),
        }
    }
}

/// Starts agents as Unix session leaders via `setsid` in a pre-exec hook,
/// matching the isolation the teacher's own agent adapters give spawned
/// subprocesses.
pub struct UnixProcessStarter;

#[async_trait]
impl ProcessStarter for UnixProcessStarter {
    async fn start(
        &self,
        cwd: &Path,
        program: &str,
        args: &[String],
        extra_env: &[(String, String)],
    ) -> std::io::Result<Box<dyn ProcessHandle>> {
        let mut command = Command::new(program);
        command.args(args).current_dir(cwd);
        for (k, v) in extra_env {
            command.env(k, v);
        }
        // SAFETY: setsid(2) is async-signal-safe and is the only call made
        // in the pre-exec hook, per the nix/tokio pre_exec contract.
        unsafe {
            command.pre_exec(|| {
                nix::unistd::setsid().map_err(std::io::Error::from)?;
                Ok(())
            });
        }
        let child = command.spawn()?;
        let pid = child.id().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "spawned child has no pid")
        })?;
        Ok(Box::new(TokioProcessHandle { child, pid }))
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
