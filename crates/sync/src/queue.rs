// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline queue of audit mutations waiting for upload.
//!
//! The whole queue (entries, next sequence number and last-sync bookkeeping)
//! is one JSON document under [`keys::SYNC_QUEUE`], so every mutation is a
//! single atomic store write. Entries are kept in insertion order, oldest
//! first. There is no deduplication on enqueue; [`coalesce`] decides what a
//! drain actually sends.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use qa_core::{Audit, Change, ChangeKind};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::store::{keys, KeyValueStore, LocalData, StoreError, StoreResult};

/// Persisted queue document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct QueueState {
    /// Sequence number handed to the next enqueued change.
    #[serde(default = "first_seq")]
    next_seq: u64,
    #[serde(default)]
    entries: Vec<Change>,
    #[serde(default)]
    last_sync_at: Option<DateTime<Utc>>,
    #[serde(default)]
    last_sync_failed: bool,
    /// Audits whose queued change was quarantined. The pull keeps them until
    /// the server lists them or a new change is queued.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    held: Vec<String>,
}

/// The queue document as stored, with entries left undecoded so a bad entry
/// costs only itself.
#[derive(Deserialize)]
struct StoredQueue {
    #[serde(default = "first_seq")]
    next_seq: u64,
    #[serde(default)]
    entries: Vec<serde_json::Value>,
    #[serde(default)]
    last_sync_at: Option<DateTime<Utc>>,
    #[serde(default)]
    last_sync_failed: bool,
    #[serde(default)]
    held: Vec<String>,
}

fn first_seq() -> u64 {
    1
}

impl QueueState {
    fn empty() -> Self {
        QueueState {
            next_seq: first_seq(),
            ..Default::default()
        }
    }
}

/// What a drain should do with the current entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrainPlan {
    /// The latest entry per audit id, in queue order.
    pub send: Vec<Change>,
    /// Sequence numbers of older entries made redundant by a later one for
    /// the same audit.
    pub superseded: Vec<u64>,
}

/// Keep only the latest entry per audit id.
///
/// Later writes carry the full audit state, so they supersede anything queued
/// before them for the same id. An update whose audit still has a queued
/// create is sent as a create, since the server has not seen it yet.
pub fn coalesce(entries: &[Change]) -> DrainPlan {
    let mut latest: HashMap<&str, u64> = HashMap::new();
    let mut unsent_create: HashSet<&str> = HashSet::new();
    for change in entries {
        let seq = latest.entry(change.audit_id.as_str()).or_insert(change.seq);
        if change.seq > *seq {
            *seq = change.seq;
        }
        if change.kind == ChangeKind::Create {
            unsent_create.insert(change.audit_id.as_str());
        }
    }

    let mut plan = DrainPlan::default();
    for change in entries {
        if latest.get(change.audit_id.as_str()) != Some(&change.seq) {
            plan.superseded.push(change.seq);
            continue;
        }
        let mut send = change.clone();
        if send.kind == ChangeKind::Update && unsent_create.contains(change.audit_id.as_str()) {
            send.kind = ChangeKind::Create;
        }
        plan.send.push(send);
    }
    plan
}

/// Persistent queue of pending changes.
pub struct SyncQueue {
    data: LocalData,
    /// Serializes read-modify-write cycles on the queue document.
    lock: Mutex<()>,
}

impl SyncQueue {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        SyncQueue {
            data: LocalData::new(store),
            lock: Mutex::new(()),
        }
    }

    fn guard(&self) -> StoreResult<MutexGuard<'_, ()>> {
        self.lock
            .lock()
            .map_err(|_| StoreError::Unavailable("sync queue lock poisoned".to_string()))
    }

    /// Load the queue. Entries that fail to decode or validate are
    /// quarantined one by one and the audits they named are held.
    fn load(&self) -> StoreResult<QueueState> {
        let Some(stored) = self.data.load::<StoredQueue>(keys::SYNC_QUEUE)? else {
            return Ok(QueueState::empty());
        };
        let mut state = QueueState {
            next_seq: stored.next_seq,
            entries: Vec::with_capacity(stored.entries.len()),
            last_sync_at: stored.last_sync_at,
            last_sync_failed: stored.last_sync_failed,
            held: stored.held,
        };

        let mut max_seq = 0;
        let mut rejected = Vec::new();
        for value in stored.entries {
            if let Some(seq) = value.get("seq").and_then(|v| v.as_u64()) {
                max_seq = max_seq.max(seq);
            }
            let error = match serde_json::from_value::<Change>(value.clone()) {
                Ok(change) => match change.validate() {
                    Ok(()) => {
                        state.entries.push(change);
                        continue;
                    }
                    Err(e) => e.to_string(),
                },
                Err(e) => e.to_string(),
            };
            warn!(error = %error, "dropping invalid queue entry");
            if let Some(id) = value.get("audit_id").and_then(|v| v.as_str()) {
                if !state.held.iter().any(|held| held == id) {
                    state.held.push(id.to_string());
                }
            }
            rejected.push(value);
        }
        // Never hand out a sequence number already in use.
        state.next_seq = state.next_seq.max(max_seq + 1);
        if !rejected.is_empty() {
            self.data.quarantine_records(keys::SYNC_QUEUE, &rejected)?;
            self.save(&state)?;
        }
        Ok(state)
    }

    fn save(&self, state: &QueueState) -> StoreResult<()> {
        self.data.put(keys::SYNC_QUEUE, state)
    }

    fn modify<T>(&self, f: impl FnOnce(&mut QueueState) -> T) -> StoreResult<T> {
        let _guard = self.guard()?;
        let mut state = self.load()?;
        let result = f(&mut state);
        self.save(&state)?;
        Ok(result)
    }

    fn push(&self, build: impl FnOnce(u64) -> Change) -> StoreResult<Change> {
        let change = self.modify(|state| {
            let change = build(state.next_seq);
            state.next_seq += 1;
            state.held.retain(|id| *id != change.audit_id);
            state.entries.push(change.clone());
            change
        })?;
        debug!(seq = change.seq, kind = %change.kind, audit_id = %change.audit_id, "enqueued change");
        Ok(change)
    }

    /// Append a create or update carrying a snapshot of `audit`.
    pub fn enqueue(&self, kind: ChangeKind, audit: &Audit) -> StoreResult<Change> {
        if kind == ChangeKind::Delete {
            return self.enqueue_delete(&audit.id);
        }
        audit.validate()?;
        self.push(|seq| Change::write(seq, kind, audit.clone()))
    }

    /// Append a delete of `audit_id`.
    pub fn enqueue_delete(&self, audit_id: &str) -> StoreResult<Change> {
        self.push(|seq| Change::delete(seq, audit_id))
    }

    /// Remove an acknowledged entry. Returns false if it was not queued.
    pub fn dequeue_acknowledged(&self, seq: u64) -> StoreResult<bool> {
        self.modify(|state| {
            let before = state.entries.len();
            state.entries.retain(|c| c.seq != seq);
            state.entries.len() != before
        })
    }

    /// Apply a drain plan before sending: drop superseded entries and record
    /// any update promoted to a create, so a failed send keeps its kind.
    /// Returns the number of entries dropped.
    pub fn settle(&self, plan: &DrainPlan) -> StoreResult<usize> {
        let promoted: Vec<u64> = plan
            .send
            .iter()
            .filter(|c| c.kind == ChangeKind::Create)
            .map(|c| c.seq)
            .collect();
        if plan.superseded.is_empty() && promoted.is_empty() {
            return Ok(0);
        }
        self.modify(|state| {
            let before = state.entries.len();
            state.entries.retain(|c| !plan.superseded.contains(&c.seq));
            for change in state.entries.iter_mut() {
                if promoted.contains(&change.seq) {
                    change.kind = ChangeKind::Create;
                }
            }
            before - state.entries.len()
        })
    }

    /// All pending entries, oldest first.
    pub fn peek_all(&self) -> StoreResult<Vec<Change>> {
        let _guard = self.guard()?;
        Ok(self.load()?.entries)
    }

    /// Plan the next drain from the current entries.
    pub fn drain_plan(&self) -> StoreResult<DrainPlan> {
        Ok(coalesce(&self.peek_all()?))
    }

    /// Number of unacknowledged entries.
    pub fn pending_count(&self) -> StoreResult<usize> {
        Ok(self.peek_all()?.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.pending_count()? == 0)
    }

    /// Point pending entries for `old_id` at the server-assigned `new_id`.
    pub fn rekey(&self, old_id: &str, new_id: &str) -> StoreResult<usize> {
        self.modify(|state| {
            let mut count = 0;
            for change in state.entries.iter_mut().filter(|c| c.audit_id == old_id) {
                change.audit_id = new_id.to_string();
                if let Some(ref mut audit) = change.audit {
                    audit.id = new_id.to_string();
                }
                count += 1;
            }
            count
        })
    }

    /// Audits held back from stale removal after their queued change was
    /// quarantined.
    pub fn held(&self) -> StoreResult<Vec<String>> {
        let _guard = self.guard()?;
        Ok(self.load()?.held)
    }

    /// Stop holding the audits the server has listed.
    pub fn release_held(&self, listed: &HashSet<String>) -> StoreResult<()> {
        let _guard = self.guard()?;
        let mut state = self.load()?;
        let before = state.held.len();
        state.held.retain(|id| !listed.contains(id));
        if state.held.len() != before {
            self.save(&state)?;
        }
        Ok(())
    }

    /// Drop every entry, keeping sync bookkeeping.
    pub fn clear(&self) -> StoreResult<()> {
        self.modify(|state| state.entries.clear())
    }

    /// When the last sync cycle completed, if ever.
    pub fn last_sync(&self) -> StoreResult<Option<DateTime<Utc>>> {
        let _guard = self.guard()?;
        Ok(self.load()?.last_sync_at)
    }

    /// Whether the last sync attempt left work undone.
    pub fn last_sync_failed(&self) -> StoreResult<bool> {
        let _guard = self.guard()?;
        Ok(self.load()?.last_sync_failed)
    }

    /// Record a completed cycle.
    pub fn record_sync(&self, at: DateTime<Utc>, failed: bool) -> StoreResult<()> {
        self.modify(|state| {
            state.last_sync_at = Some(at);
            state.last_sync_failed = failed;
        })
    }

    /// Record an aborted cycle without moving the last-sync timestamp.
    pub fn mark_failed(&self) -> StoreResult<()> {
        self.modify(|state| state.last_sync_failed = true)
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
