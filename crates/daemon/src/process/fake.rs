// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic fakes for [`super::CommandRunner`] and
//! [`super::ProcessStarter`], shared by the pool/poller/reconciler unit
//! tests so none of them touch a real subprocess.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use nix::sys::signal::Signal;
use parking_lot::Mutex;
use tokio::sync::oneshot;

use super::{CommandOutput, CommandRunner, ProcessHandle, ProcessStarter};

/// Records every invocation and replays canned outputs in call order,
/// falling back to a default success response once exhausted.
pub struct FakeCommandRunner {
    pub calls: Mutex<Vec<(PathBuf, String, Vec<String>)>>,
    queued: Mutex<VecDeque<CommandOutput>>,
}

impl FakeCommandRunner {
    pub fn new() -> Self {
        Self { calls: Mutex::new(Vec::new()), queued: Mutex::new(VecDeque::new()) }
    }

    pub fn push_output(&self, output: CommandOutput) {
        self.queued.lock().push_back(output);
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn calls_for(&self, program: &str) -> Vec<Vec<String>> {
        self.calls
            .lock()
            .iter()
            .filter(|(_, p, _)| p == program)
            .map(|(_, _, args)| args.clone())
            .collect()
    }
}

impl Default for FakeCommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandRunner for FakeCommandRunner {
    async fn run(&self, cwd: &Path, program: &str, args: &[String]) -> std::io::Result<CommandOutput> {
        self.calls.lock().push((cwd.to_path_buf(), program.to_string(), args.to_vec()));
        Ok(self.queued.lock().pop_front().unwrap_or(CommandOutput {
            status: 0,
            stdout: String::new(),
            stderr: String::new(),
        }))
    }
}

/// A fake subprocess handle whose exit is driven by the test via
/// [`FakeProcessStarter::finish`].
pub struct FakeProcessHandle {
    pid: u32,
    exit_rx: Mutex<Option<oneshot::Receiver<i32>>>,
}

#[async_trait]
impl ProcessHandle for FakeProcessHandle {
    fn pid(&self) -> u32 {
        self.pid
    }

    async fn wait(&mut self) -> std::io::Result<ExitStatus> {
        let rx = self.exit_rx.lock().take();
        let code = match rx {
            Some(rx) => rx.await.unwrap_or(1),
            None => 0,
        };
        Ok(exit_status_from_code(code))
    }

    fn signal(&self, _sig: Signal) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(unix)]
fn exit_status_from_code(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

/// Starts fake subprocesses; each spawn is recorded and assigned an
/// incrementing pid. Tests call [`FakeProcessStarter::finish`] with a pid
/// and exit code to simulate the subprocess exiting.
pub struct FakeProcessStarter {
    next_pid: AtomicU32,
    senders: Mutex<std::collections::HashMap<u32, oneshot::Sender<i32>>>,
    pub spawns: Mutex<Vec<(String, Vec<String>, Vec<(String, String)>)>>,
}

impl FakeProcessStarter {
    pub fn new() -> Self {
        Self {
            next_pid: AtomicU32::new(1000),
            senders: Mutex::new(std::collections::HashMap::new()),
            spawns: Mutex::new(Vec::new()),
        }
    }

    pub fn finish(&self, pid: u32, exit_code: i32) {
        if let Some(tx) = self.senders.lock().remove(&pid) {
            let _ = tx.send(exit_code);
        }
    }
}

impl Default for FakeProcessStarter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessStarter for FakeProcessStarter {
    async fn start(
        &self,
        _cwd: &Path,
        program: &str,
        args: &[String],
        extra_env: &[(String, String)],
    ) -> std::io::Result<Box<dyn ProcessHandle>> {
        let pid = self.next_pid.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = oneshot::channel();
        self.senders.lock().insert(pid, tx);
        self.spawns.lock().push((program.to_string(), args.to_vec(), extra_env.to_vec()));
        Ok(Box::new(FakeProcessHandle { pid, exit_rx: Mutex::new(Some(rx)) }))
    }
}
