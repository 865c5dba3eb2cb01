// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Git plumbing for the Reconciler: fetching the integration ref and
//! testing branch ancestry. Runs `git` as a child process through the
//! same [`CommandRunner`] seam the Tracker uses, so both share one fake
//! harness in tests.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::process::CommandRunner;

#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("git command failed: {0}")]
    CommandFailed(String),
    #[error("git I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GitError {
    pub fn code(&self) -> &'static str {
        match self {
            GitError::CommandFailed(_) => "git.command_failed",
            GitError::Io(_) => "io",
        }
    }
}

pub struct Git {
    runner: Arc<dyn CommandRunner>,
    repo_dir: PathBuf,
}

impl Git {
    pub fn new(runner: Arc<dyn CommandRunner>, repo_dir: impl Into<PathBuf>) -> Self {
        Self { runner, repo_dir: repo_dir.into() }
    }

    /// Fetch `remote`, best-effort: a failure (e.g. "no remote configured")
    /// is reported to the caller, who degrades to local-only state with a
    /// debug log rather than treating it as fatal.
    pub async fn fetch(&self, remote: &str) -> Result<(), GitError> {
        self.run(&["fetch".into(), remote.into()]).await.map(drop)
    }

    /// True if `branch` does not exist locally (treated as "already
    /// merged and cleaned up" by the caller) or its tip is an ancestor of
    /// `integration_ref`.
    pub async fn is_merged(&self, branch: &str, integration_ref: &str) -> Result<bool, GitError> {
        if !self.branch_exists(branch).await? {
            return Ok(true);
        }
        let result = self
            .runner
            .run(self.repo_dir(), "git", &["merge-base".into(), "--is-ancestor".into(), branch.into(), integration_ref.into()])
            .await?;
        Ok(result.success())
    }

    async fn branch_exists(&self, branch: &str) -> Result<bool, GitError> {
        let result = self
            .runner
            .run(self.repo_dir(), "git", &["rev-parse".into(), "--verify".into(), "--quiet".into(), branch.into()])
            .await?;
        Ok(result.success())
    }

    async fn run(&self, args: &[String]) -> Result<crate::process::CommandOutput, GitError> {
        let output = self.runner.run(self.repo_dir(), "git", args).await?;
        if !output.success() {
            return Err(GitError::CommandFailed(output.stderr));
        }
        Ok(output)
    }

    fn repo_dir(&self) -> &Path {
        &self.repo_dir
    }
}

#[cfg(test)]
#[path = "git_tests.rs"]
mod tests;
