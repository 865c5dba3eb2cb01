// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-session bounded ring buffers for runtime events, with idle eviction
//! and a `follow` surface that wakes waiters as new events land.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use aether_core::Event;
use parking_lot::Mutex;
use tokio::sync::Notify;

/// A single event paired with its per-session sequence number, exposed so
/// callers can detect a buffer overflow gap between two `list` calls.
#[derive(Debug, Clone)]
pub struct Sequenced {
    pub seq: u64,
    pub event: Event,
}

struct Ring {
    events: VecDeque<Sequenced>,
    next_seq: u64,
    dropped: u64,
    last_seen_ms: u64,
    terminated: bool,
    notify: Arc<Notify>,
}

impl Ring {
    fn new(capacity: usize, now_ms: u64) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity),
            next_seq: 0,
            dropped: 0,
            last_seen_ms: now_ms,
            terminated: false,
            notify: Arc::new(Notify::new()),
        }
    }
}

/// Result of a `list` call: the matching events plus whether the caller's
/// `after` cursor fell behind the oldest retained sequence number (a gap).
#[derive(Debug, Clone, Default)]
pub struct ListResult {
    pub events: Vec<Sequenced>,
    pub dropped: u64,
}

/// Outcome of one `follow` poll.
#[derive(Debug, Clone)]
pub enum FollowOutcome {
    /// New events are available; the caller should advance its cursor to
    /// the last returned `seq` and poll again.
    Events(Vec<Sequenced>),
    /// The session emitted `session.idle`/`session.error`; no more events
    /// will arrive and the follow should end.
    Terminated,
    /// The session has never been seen (no ring allocated yet). Callers
    /// following a not-yet-created session should retry after a short
    /// delay rather than treat this as terminal.
    Unknown,
}

pub struct EventBuffer {
    rings: Mutex<HashMap<String, Ring>>,
    capacity: usize,
}

impl EventBuffer {
    pub fn new(capacity: usize) -> Self {
        Self { rings: Mutex::new(HashMap::new()), capacity }
    }

    /// Append `event`, allocating a ring for its session on first sight.
    pub fn ingest(&self, event: Event, now_ms: u64) {
        let mut rings = self.rings.lock();
        let ring = rings
            .entry(event.session_id.clone())
            .or_insert_with(|| Ring::new(self.capacity, now_ms));

        let terminates = event.terminates_follow();
        let seq = ring.next_seq;
        ring.next_seq += 1;
        ring.last_seen_ms = now_ms;
        if ring.events.len() >= self.capacity {
            ring.events.pop_front();
            ring.dropped += 1;
        }
        ring.events.push_back(Sequenced { seq, event });
        if terminates {
            ring.terminated = true;
        }
        ring.notify.notify_waiters();
    }

    /// Events for `session_id` with `seq > after_seq`, oldest first,
    /// capped at `limit`, plus the running drop count for that session.
    pub fn list(&self, session_id: &str, after_seq: u64, limit: usize) -> ListResult {
        let rings = self.rings.lock();
        let Some(ring) = rings.get(session_id) else {
            return ListResult::default();
        };
        let events = ring
            .events
            .iter()
            .filter(|s| s.seq > after_seq)
            .take(limit)
            .cloned()
            .collect();
        ListResult { events, dropped: ring.dropped }
    }

    /// Waits for events newer than `after_seq`, or for the session to
    /// terminate, whichever comes first. Returns immediately if such
    /// events already exist.
    pub async fn follow(&self, session_id: &str, after_seq: u64) -> FollowOutcome {
        loop {
            let notify = {
                let rings = self.rings.lock();
                let Some(ring) = rings.get(session_id) else {
                    return FollowOutcome::Unknown;
                };
                let fresh: Vec<Sequenced> =
                    ring.events.iter().filter(|s| s.seq > after_seq).cloned().collect();
                if !fresh.is_empty() {
                    return FollowOutcome::Events(fresh);
                }
                if ring.terminated {
                    return FollowOutcome::Terminated;
                }
                ring.notify.clone()
            };
            notify.notified().await;
        }
    }

    /// Drop rings whose `last_seen_ms` predates `now_ms - ttl_ms`.
    pub fn evict_idle(&self, now_ms: u64, ttl_ms: u64) -> usize {
        let mut rings = self.rings.lock();
        let before = rings.len();
        rings.retain(|_, ring| ring.last_seen_ms + ttl_ms >= now_ms);
        before - rings.len()
    }

    pub fn session_count(&self) -> usize {
        self.rings.lock().len()
    }

    /// Whether a ring has already been allocated for `session_id` — used
    /// at startup to skip backfilling sessions already seen live.
    pub fn contains(&self, session_id: &str) -> bool {
        self.rings.lock().contains_key(session_id)
    }
}

#[cfg(test)]
#[path = "event_buffer_tests.rs"]
mod tests;
