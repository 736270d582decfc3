// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The sync service: push queued changes, then pull the server's audits.
//!
//! A cycle moves `Idle -> Syncing -> Idle` and ends in success or partial
//! failure. At most one cycle runs at a time; a trigger that arrives while a
//! cycle is running is ignored. The in-flight flag is claimed before the
//! first await, so two triggers fired back to back cannot both start a cycle.
//!
//! Push drains the queue one coalesced entry at a time. A failed entry stays
//! queued and the drain moves on. Pull only runs when push left nothing behind,
//! and replaces the local audit collection with the server's list, keeping
//! local versions of audits that still have pending changes.
//!
//! There is no retry loop. Whatever fails waits for the next trigger.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use qa_core::{Audit, Change, ChangeKind};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::api::{ApiClient, ApiError, ApiResult, HttpApiClient};
use crate::queue::SyncQueue;
use crate::store::{KeyValueStore, LocalData, StoreError};

/// Default bound on a single API call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that abort a sync cycle or a local mutation.
///
/// Per-entry API failures do not appear here; they are reported in
/// [`SyncReport::failures`] and the entries stay queued.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The server rejected the session. The caller must re-authenticate.
    #[error("sync stopped: session is no longer valid\n  hint: run `qa login` to sign in again")]
    Auth,

    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error("audit not found: {0}\n  hint: run `qa audit list` to see local audits")]
    AuditNotFound(String),
}

/// What started a sync cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTrigger {
    AppStart,
    Reconnect,
    /// Explicit refresh by the user. Runs even in offline mode.
    UserRefresh,
    Periodic,
}

impl SyncTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncTrigger::AppStart => "app_start",
            SyncTrigger::Reconnect => "reconnect",
            SyncTrigger::UserRefresh => "user_refresh",
            SyncTrigger::Periodic => "periodic",
        }
    }

    /// Automatic triggers are suppressed while offline mode is on.
    pub fn is_automatic(&self) -> bool {
        !matches!(self, SyncTrigger::UserRefresh)
    }
}

impl fmt::Display for SyncTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SyncPhase {
    #[default]
    Idle,
    Syncing,
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncPhase::Idle => write!(f, "idle"),
            SyncPhase::Syncing => write!(f, "syncing"),
        }
    }
}

/// Snapshot published on the status channel for display.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncStatus {
    pub phase: SyncPhase,
    /// Unacknowledged queue entries.
    pub pending: usize,
    pub last_sync_at: Option<DateTime<Utc>>,
    pub last_sync_failed: bool,
    pub last_error: Option<String>,
}

/// A queue entry the server did not accept this cycle.
#[derive(Debug, Clone)]
pub struct EntryFailure {
    pub seq: u64,
    pub kind: ChangeKind,
    pub audit_id: String,
    pub error: ApiError,
}

/// What one completed cycle did.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub trigger: SyncTrigger,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Entries the server acknowledged.
    pub acknowledged: usize,
    /// Older entries dropped in favour of a later one for the same audit.
    pub superseded: usize,
    pub failures: Vec<EntryFailure>,
    /// Audits written locally by the pull, `None` if pull did not run.
    pub pulled: Option<usize>,
    /// Local audits removed because the server no longer has them.
    pub removed_stale: usize,
    pub pull_error: Option<ApiError>,
}

impl SyncReport {
    fn new(trigger: SyncTrigger) -> Self {
        let now = Utc::now();
        SyncReport {
            trigger,
            started_at: now,
            finished_at: now,
            acknowledged: 0,
            superseded: 0,
            failures: Vec::new(),
            pulled: None,
            removed_stale: 0,
            pull_error: None,
        }
    }

    /// True when every entry was acknowledged and the pull succeeded.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.pull_error.is_none()
    }

    fn first_error(&self) -> Option<String> {
        self.failures
            .first()
            .map(|f| format!("{} {}: {}", f.kind, f.audit_id, f.error))
            .or_else(|| self.pull_error.as_ref().map(|e| format!("pull: {e}")))
    }
}

/// Result of asking for a sync.
#[derive(Debug, Clone)]
pub enum SyncOutcome {
    /// A cycle ran to completion, possibly with per-entry failures.
    Completed(SyncReport),
    /// Another cycle was already in flight; this trigger was ignored.
    AlreadyRunning,
    /// An automatic trigger arrived while offline mode is on.
    OfflineMode,
}

/// Resets the in-flight flag however the cycle ends.
struct CycleGuard<'a> {
    flag: &'a AtomicBool,
    status: &'a watch::Sender<SyncStatus>,
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
        self.status.send_modify(|s| s.phase = SyncPhase::Idle);
    }
}

/// Orchestrates push and pull against an [`ApiClient`].
pub struct SyncService<A: ApiClient = HttpApiClient> {
    api: Arc<A>,
    data: LocalData,
    queue: SyncQueue,
    request_timeout: Duration,
    syncing: AtomicBool,
    status: watch::Sender<SyncStatus>,
}

impl<A: ApiClient> SyncService<A> {
    pub fn new(api: Arc<A>, store: Arc<dyn KeyValueStore>) -> Self {
        let (status, _) = watch::channel(SyncStatus::default());
        let service = SyncService {
            api,
            data: LocalData::new(store.clone()),
            queue: SyncQueue::new(store),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            syncing: AtomicBool::new(false),
            status,
        };
        if let Err(e) = service.refresh_status() {
            warn!(error = %e, "could not read sync state");
        }
        service
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn api(&self) -> &Arc<A> {
        &self.api
    }

    pub fn data(&self) -> &LocalData {
        &self.data
    }

    pub fn queue(&self) -> &SyncQueue {
        &self.queue
    }

    /// Current status snapshot.
    pub fn status(&self) -> SyncStatus {
        self.status.borrow().clone()
    }

    /// Receive every status change.
    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.status.subscribe()
    }

    pub fn is_syncing(&self) -> bool {
        self.syncing.load(Ordering::Acquire)
    }

    /// Re-read pending count and last-sync bookkeeping from the store.
    pub fn refresh_status(&self) -> Result<(), StoreError> {
        let pending = self.queue.pending_count()?;
        let last_sync_at = self.queue.last_sync()?;
        let last_sync_failed = self.queue.last_sync_failed()?;
        self.status.send_modify(|s| {
            s.pending = pending;
            s.last_sync_at = last_sync_at;
            s.last_sync_failed = last_sync_failed;
        });
        Ok(())
    }

    fn publish_pending(&self) {
        match self.queue.pending_count() {
            Ok(pending) => self.status.send_modify(|s| s.pending = pending),
            Err(e) => warn!(error = %e, "could not read pending count"),
        }
    }

    // Local mutations

    /// Store a new audit and queue its upload.
    pub fn create_audit(&self, audit: &Audit) -> Result<Change, SyncError> {
        self.data.add_audit(audit)?;
        let change = self.queue.enqueue(ChangeKind::Create, audit)?;
        self.publish_pending();
        Ok(change)
    }

    /// Overwrite an existing audit and queue the update.
    pub fn save_audit(&self, audit: &Audit) -> Result<Change, SyncError> {
        if !self.data.update_audit(audit)? {
            return Err(SyncError::AuditNotFound(audit.id.clone()));
        }
        let change = self.queue.enqueue(ChangeKind::Update, audit)?;
        self.publish_pending();
        Ok(change)
    }

    /// Remove an audit locally and queue the delete.
    pub fn delete_audit(&self, id: &str) -> Result<Change, SyncError> {
        if !self.data.delete_audit(id)? {
            return Err(SyncError::AuditNotFound(id.to_string()));
        }
        let change = self.queue.enqueue_delete(id)?;
        self.publish_pending();
        Ok(change)
    }

    // Sync cycle

    /// Run one cycle unless one is already running.
    ///
    /// Per-entry failures leave the entries queued and are reported in the
    /// returned [`SyncReport`]. Only an auth rejection or a storage failure
    /// aborts the cycle.
    pub async fn sync(&self, trigger: SyncTrigger) -> Result<SyncOutcome, SyncError> {
        if trigger.is_automatic() && self.data.settings()?.offline_mode {
            debug!(%trigger, "offline mode, ignoring trigger");
            return Ok(SyncOutcome::OfflineMode);
        }
        if self
            .syncing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(%trigger, "sync already in progress, ignoring trigger");
            return Ok(SyncOutcome::AlreadyRunning);
        }
        let _guard = CycleGuard {
            flag: &self.syncing,
            status: &self.status,
        };
        self.status.send_modify(|s| s.phase = SyncPhase::Syncing);
        info!(%trigger, "sync started");

        match self.run_cycle(trigger).await {
            Ok(report) => {
                let failed = !report.is_success();
                self.queue.record_sync(report.finished_at, failed)?;
                self.refresh_status()?;
                self.status.send_modify(|s| s.last_error = report.first_error());
                if failed {
                    warn!(
                        acknowledged = report.acknowledged,
                        failed = report.failures.len(),
                        "sync finished with failures"
                    );
                } else {
                    info!(
                        acknowledged = report.acknowledged,
                        superseded = report.superseded,
                        pulled = report.pulled.unwrap_or(0),
                        "sync finished"
                    );
                }
                Ok(SyncOutcome::Completed(report))
            }
            Err(e) => {
                error!(error = %e, "sync aborted");
                if let Err(mark) = self.queue.mark_failed() {
                    warn!(error = %mark, "could not record failed sync");
                }
                self.publish_pending();
                self.status.send_modify(|s| {
                    s.last_sync_failed = true;
                    s.last_error = Some(e.to_string());
                });
                Err(e)
            }
        }
    }

    async fn run_cycle(&self, trigger: SyncTrigger) -> Result<SyncReport, SyncError> {
        let mut report = SyncReport::new(trigger);
        self.push(&mut report).await?;
        if report.failures.is_empty() {
            self.pull(&mut report).await?;
        } else {
            info!(
                remaining = report.failures.len(),
                "skipping pull while changes are still queued"
            );
        }
        report.finished_at = Utc::now();
        Ok(report)
    }

    /// Bound `call` by the request timeout.
    async fn call<T>(&self, call: impl std::future::Future<Output = ApiResult<T>>) -> ApiResult<T> {
        match tokio::time::timeout(self.request_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(ApiError::Timeout),
        }
    }

    async fn push(&self, report: &mut SyncReport) -> Result<(), SyncError> {
        let plan = self.queue.drain_plan()?;
        report.superseded = self.queue.settle(&plan)?;
        if report.superseded > 0 {
            debug!(count = report.superseded, "dropped superseded entries");
            self.publish_pending();
        }

        for change in plan.send {
            let result = match (change.kind, change.audit.as_ref()) {
                (ChangeKind::Delete, _) => self.send_delete(&change.audit_id).await.map(|()| None),
                (ChangeKind::Create, Some(audit)) => {
                    self.call(self.api.create_audit(audit)).await.map(Some)
                }
                (ChangeKind::Update, Some(audit)) => {
                    self.call(self.api.update_audit(audit)).await.map(Some)
                }
                (kind, None) => {
                    warn!(seq = change.seq, %kind, "dropping entry without payload");
                    self.queue.dequeue_acknowledged(change.seq)?;
                    continue;
                }
            };

            match result {
                Ok(server) => {
                    self.queue.dequeue_acknowledged(change.seq)?;
                    if let Some(server) = server {
                        self.apply_ack(&change.audit_id, server)?;
                    }
                    report.acknowledged += 1;
                    info!(seq = change.seq, kind = %change.kind, audit_id = %change.audit_id, "change acknowledged");
                    self.publish_pending();
                }
                Err(ApiError::Auth) => return Err(SyncError::Auth),
                Err(error) => {
                    warn!(seq = change.seq, kind = %change.kind, audit_id = %change.audit_id, error = %error, "change not accepted, keeping it queued");
                    report.failures.push(EntryFailure {
                        seq: change.seq,
                        kind: change.kind,
                        audit_id: change.audit_id,
                        error,
                    });
                }
            }
        }
        Ok(())
    }

    /// A delete of something the server never had still counts as done.
    async fn send_delete(&self, id: &str) -> ApiResult<()> {
        match self.call(self.api.delete_audit(id)).await {
            Err(e) if e.is_not_found() => {
                debug!(audit_id = %id, "already gone on server");
                Ok(())
            }
            other => other,
        }
    }

    /// Fold the server's copy of an acknowledged write into local state.
    fn apply_ack(&self, local_id: &str, server: Audit) -> Result<(), SyncError> {
        if let Err(e) = server.validate() {
            warn!(audit_id = %local_id, error = %e, "ignoring invalid server copy");
            return Ok(());
        }
        // A newer local edit is still queued, so local content wins.
        let still_pending = self
            .queue
            .peek_all()?
            .iter()
            .any(|c| c.audit_id == local_id);

        if server.id != local_id {
            if let Some(mut local) = self.data.audit(local_id)? {
                let record = if still_pending {
                    local.id = server.id.clone();
                    local
                } else {
                    server.clone()
                };
                self.data.replace_audit(local_id, &record)?;
            }
            let rekeyed = self.queue.rekey(local_id, &server.id)?;
            info!(old_id = %local_id, new_id = %server.id, rekeyed, "server assigned audit id");
        } else if !still_pending {
            self.data.update_audit(&server)?;
        }
        Ok(())
    }

    async fn pull(&self, report: &mut SyncReport) -> Result<(), SyncError> {
        let remote = match self.call(self.api.list_audits()).await {
            Ok(remote) => remote,
            Err(ApiError::Auth) => return Err(SyncError::Auth),
            Err(e) => {
                warn!(error = %e, "could not fetch audits");
                report.pull_error = Some(e);
                return Ok(());
            }
        };

        // Changes queued while this cycle was running.
        let pending = self.queue.peek_all()?;
        let latest: HashMap<&str, &Change> = pending
            .iter()
            .map(|c| (c.audit_id.as_str(), c))
            .collect();
        let local = self.data.audits()?;
        let local_by_id: HashMap<&str, &Audit> = local.iter().map(|a| (a.id.as_str(), a)).collect();

        let mut merged: Vec<Audit> = Vec::with_capacity(remote.len());
        let mut seen: HashSet<String> = HashSet::new();
        for audit in remote {
            if let Err(e) = audit.validate() {
                warn!(audit_id = %audit.id, error = %e, "skipping invalid remote audit");
                continue;
            }
            if !seen.insert(audit.id.clone()) {
                continue;
            }
            match latest.get(audit.id.as_str()) {
                Some(change) if change.kind == ChangeKind::Delete => {}
                Some(_) => match local_by_id.get(audit.id.as_str()) {
                    Some(local) => merged.push((*local).clone()),
                    None => merged.push(audit),
                },
                None => merged.push(audit),
            }
        }
        self.queue.release_held(&seen)?;
        let held = self.queue.held()?;
        // Pending creates the server has not seen yet, and audits whose queued
        // change was lost to corruption.
        for audit in &local {
            let pending_write = latest
                .get(audit.id.as_str())
                .is_some_and(|c| c.kind != ChangeKind::Delete);
            let keep = pending_write || held.contains(&audit.id);
            if keep && seen.insert(audit.id.clone()) {
                merged.push(audit.clone());
            }
        }

        report.removed_stale = local
            .iter()
            .filter(|a| !merged.iter().any(|m| m.id == a.id))
            .count();
        if report.removed_stale > 0 {
            debug!(count = report.removed_stale, "removing stale local audits");
        }
        report.pulled = Some(merged.len());
        self.data.save_audits(&merged)?;
        Ok(())
    }

    /// Trigger a cycle every `sync_interval_minutes` while `auto_sync` is on.
    ///
    /// Settings are re-read each round. Returns only when the server rejects
    /// the session.
    pub async fn run_periodic(&self) -> Result<(), SyncError> {
        loop {
            let minutes = match self.data.settings() {
                Ok(settings) => settings.sync_interval_minutes.max(1),
                Err(e) => {
                    warn!(error = %e, "could not read settings, using default interval");
                    qa_core::Settings::default().sync_interval_minutes
                }
            };
            tokio::time::sleep(Duration::from_secs(u64::from(minutes) * 60)).await;

            match self.data.settings() {
                Ok(settings) if !settings.auto_sync => continue,
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, "could not read settings");
                    continue;
                }
            }
            match self.sync(SyncTrigger::Periodic).await {
                Ok(_) => {}
                Err(SyncError::Auth) => return Err(SyncError::Auth),
                Err(e) => warn!(error = %e, "periodic sync failed"),
            }
        }
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
