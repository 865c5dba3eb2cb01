// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persistent index of `session_id -> agent` correlations, surviving
//! daemon restarts. The runtime remains the source of truth for
//! conversation content; this registry only lets the kernel rediscover
//! which sessions belonged to which task after a crash.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use aether_core::SessionRecord;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("failed to read session registry {path}: {source}")]
    Read { path: PathBuf, #[source] source: std::io::Error },
    #[error("failed to parse session registry {path}: {source}")]
    Parse { path: PathBuf, #[source] source: serde_json::Error },
    #[error("failed to serialize session registry {path}: {source}")]
    Serialize { path: PathBuf, #[source] source: serde_json::Error },
    #[error("failed to write session registry {path}: {source}")]
    Write { path: PathBuf, #[source] source: std::io::Error },
}

impl RegistryError {
    pub fn code(&self) -> &'static str {
        match self {
            RegistryError::Read { .. } => "registry.read_failed",
            RegistryError::Parse { .. } => "registry.parse_failed",
            RegistryError::Serialize { .. } => "registry.serialize_failed",
            RegistryError::Write { .. } => "registry.write_failed",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RegistryFile {
    sessions: HashMap<String, SessionRecord>,
}

pub struct SessionRegistry {
    path: PathBuf,
    sessions: RwLock<HashMap<String, SessionRecord>>,
}

impl SessionRegistry {
    /// Well-known path: `<config_dir>/aetherflow/sessions-<project>.json`.
    /// Falls back to the system temp dir if no config dir is resolvable
    /// (e.g. a minimal container without `$HOME`).
    pub fn default_path(project: &str) -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(std::env::temp_dir);
        base.join("aetherflow").join(format!("sessions-{project}.json"))
    }

    /// Load the registry from `path`, treating an absent file as empty.
    pub fn load(path: PathBuf) -> Result<Self, RegistryError> {
        let sessions = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|source| RegistryError::Read { path: path.clone(), source })?;
            let file: RegistryFile = serde_json::from_str(&contents)
                .map_err(|source| RegistryError::Parse { path: path.clone(), source })?;
            file.sessions
        } else {
            HashMap::new()
        };
        Ok(Self { path, sessions: RwLock::new(sessions) })
    }

    pub fn insert(&self, record: SessionRecord) -> Result<(), RegistryError> {
        self.sessions.write().insert(record.session_id.clone(), record);
        self.persist()
    }

    pub fn touch(&self, session_id: &str, now_ms: u64) -> Result<(), RegistryError> {
        let changed = {
            let mut sessions = self.sessions.write();
            match sessions.get_mut(session_id) {
                Some(record) => {
                    record.touch(now_ms);
                    true
                }
                None => false,
            }
        };
        if changed {
            self.persist()?;
        }
        Ok(())
    }

    pub fn get(&self, session_id: &str) -> Option<SessionRecord> {
        self.sessions.read().get(session_id).cloned()
    }

    pub fn remove(&self, session_id: &str) -> Result<Option<SessionRecord>, RegistryError> {
        let removed = self.sessions.write().remove(session_id);
        if removed.is_some() {
            self.persist()?;
        }
        Ok(removed)
    }

    /// All entries whose `project` matches, for startup reconciliation.
    pub fn for_project(&self, project: &str) -> Vec<SessionRecord> {
        self.sessions.read().values().filter(|r| r.project == project).cloned().collect()
    }

    /// Drop entries idle for at least `ttl_ms`, returning how many were
    /// evicted. Mirrors `EventBuffer::evict_idle`'s eviction rule so the
    /// persistent registry and the in-memory ring buffers age out together.
    pub fn evict_idle(&self, now_ms: u64, ttl_ms: u64) -> Result<usize, RegistryError> {
        let removed = {
            let mut sessions = self.sessions.write();
            let before = sessions.len();
            sessions.retain(|_, r| !r.is_idle(now_ms, ttl_ms));
            before - sessions.len()
        };
        if removed > 0 {
            self.persist()?;
        }
        Ok(removed)
    }

    /// Drop entries not present in `live_session_ids`, returning how many
    /// were pruned. Used at startup after confirming existence against the
    /// runtime's session list.
    pub fn prune_missing(&self, project: &str, live_session_ids: &[String]) -> Result<usize, RegistryError> {
        let removed = {
            let mut sessions = self.sessions.write();
            let before = sessions.len();
            sessions.retain(|id, r| r.project != project || live_session_ids.contains(id));
            before - sessions.len()
        };
        if removed > 0 {
            self.persist()?;
        }
        Ok(removed)
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write-to-temp-then-rename, the crash-safe pattern the teacher's
    /// snapshot storage uses for on-disk state (`storage::snapshot`).
    fn persist(&self) -> Result<(), RegistryError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|source| RegistryError::Write { path: self.path.clone(), source })?;
        }
        let file = RegistryFile { sessions: self.sessions.read().clone() };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|source| RegistryError::Serialize { path: self.path.clone(), source })?;

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json)
            .map_err(|source| RegistryError::Write { path: tmp_path.clone(), source })?;
        std::fs::rename(&tmp_path, &self.path)
            .map_err(|source| RegistryError::Write { path: self.path.clone(), source })?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "session_registry_tests.rs"]
mod tests;
