// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! In-crate fakes shared by the service, network and startup tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use qa_core::Audit;
use tokio::sync::Notify;

use crate::api::{ApiClient, ApiError, ApiFuture};
use crate::service::SyncService;
use crate::store::MemoryStore;

/// A request observed by [`FakeApi`].
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    Create(Audit),
    Update(Audit),
    Delete(String),
    List,
}

/// Scriptable stand-in for the REST API.
///
/// Behaves like an upserting server: writes land in `remote`, which is what
/// `list_audits` returns.
#[derive(Default)]
pub struct FakeApi {
    calls: Mutex<Vec<ApiCall>>,
    remote: Mutex<Vec<Audit>>,
    failures: Mutex<HashMap<String, ApiError>>,
    list_error: Mutex<Option<ApiError>>,
    server_ids: Mutex<HashMap<String, String>>,
    hang: Mutex<HashSet<String>>,
    gate: Mutex<Option<Arc<Notify>>>,
    /// Signalled each time a write reaches a closed gate.
    pub entered: Notify,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(FakeApi::default())
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Writes only, in the order they were made.
    pub fn writes(&self) -> Vec<ApiCall> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, ApiCall::List))
            .collect()
    }

    pub fn list_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, ApiCall::List))
            .count()
    }

    pub fn set_remote(&self, audits: Vec<Audit>) {
        *self.remote.lock().unwrap() = audits;
    }

    pub fn remote(&self) -> Vec<Audit> {
        self.remote.lock().unwrap().clone()
    }

    /// Fail every write for `audit_id` with `error`.
    pub fn fail(&self, audit_id: &str, error: ApiError) {
        self.failures
            .lock()
            .unwrap()
            .insert(audit_id.to_string(), error);
    }

    pub fn fail_list(&self, error: ApiError) {
        *self.list_error.lock().unwrap() = Some(error);
    }

    /// Answer creates of `local_id` with `server_id`.
    pub fn assign_id(&self, local_id: &str, server_id: &str) {
        self.server_ids
            .lock()
            .unwrap()
            .insert(local_id.to_string(), server_id.to_string());
    }

    /// Never answer writes for `audit_id`.
    pub fn hang_on(&self, audit_id: &str) {
        self.hang.lock().unwrap().insert(audit_id.to_string());
    }

    /// Hold every write until [`FakeApi::release`].
    pub fn close_gate(&self) {
        *self.gate.lock().unwrap() = Some(Arc::new(Notify::new()));
    }

    pub fn release(&self) {
        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notify_waiters();
            gate.notify_one();
        }
    }

    async fn before_write(&self, call: ApiCall, audit_id: &str) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call);
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            self.entered.notify_one();
            gate.notified().await;
        }
        let hangs = self.hang.lock().unwrap().contains(audit_id);
        if hangs {
            std::future::pending::<()>().await;
        }
        let failure = self.failures.lock().unwrap().get(audit_id).cloned();
        match failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn upsert_remote(&self, audit: &Audit) {
        let mut remote = self.remote.lock().unwrap();
        match remote.iter_mut().find(|a| a.id == audit.id) {
            Some(existing) => *existing = audit.clone(),
            None => remote.push(audit.clone()),
        }
    }
}

impl ApiClient for FakeApi {
    fn create_audit<'a>(&'a self, audit: &'a Audit) -> ApiFuture<'a, Audit> {
        Box::pin(async move {
            self.before_write(ApiCall::Create(audit.clone()), &audit.id)
                .await?;
            let mut stored = audit.clone();
            let server_id = self.server_ids.lock().unwrap().get(&audit.id).cloned();
            if let Some(server_id) = server_id {
                stored.id = server_id;
            }
            self.upsert_remote(&stored);
            Ok(stored)
        })
    }

    fn update_audit<'a>(&'a self, audit: &'a Audit) -> ApiFuture<'a, Audit> {
        Box::pin(async move {
            self.before_write(ApiCall::Update(audit.clone()), &audit.id)
                .await?;
            self.upsert_remote(audit);
            Ok(audit.clone())
        })
    }

    fn delete_audit<'a>(&'a self, id: &'a str) -> ApiFuture<'a, ()> {
        Box::pin(async move {
            self.before_write(ApiCall::Delete(id.to_string()), id)
                .await?;
            let mut remote = self.remote.lock().unwrap();
            let before = remote.len();
            remote.retain(|a| a.id != id);
            if remote.len() == before {
                return Err(ApiError::Remote {
                    status: 404,
                    message: "Audit not found".to_string(),
                });
            }
            Ok(())
        })
    }

    fn list_audits(&self) -> ApiFuture<'_, Vec<Audit>> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(ApiCall::List);
            let error = self.list_error.lock().unwrap().clone();
            match error {
                Some(error) => Err(error),
                None => Ok(self.remote()),
            }
        })
    }
}

/// A service over a fresh in-memory store.
pub fn make_service(api: &Arc<FakeApi>) -> (Arc<MemoryStore>, SyncService<FakeApi>) {
    let store = Arc::new(MemoryStore::new());
    let service = SyncService::new(api.clone(), store.clone())
        .with_request_timeout(Duration::from_millis(200));
    (store, service)
}
