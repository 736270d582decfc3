// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Typed access to the records the app keeps on the device.
//!
//! Reads validate what they decode. Anything that does not decode into a
//! valid record is moved to `<key>.quarantine` and the caller gets the
//! default (or the records that did decode), so the app keeps working after
//! corruption. Writes are validated before they reach the store.

use std::sync::Arc;

use qa_core::{Audit, Settings, User};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::{KeyValueStore, StoreResult};

/// Stable, namespaced keys for everything the app persists.
pub mod keys {
    pub const AUDITS: &str = "@quickaudit/audits";
    pub const USER: &str = "@quickaudit/user";
    pub const SETTINGS: &str = "@quickaudit/settings";
    pub const AUTH_TOKEN: &str = "@quickaudit/auth_token";
    pub const SYNC_QUEUE: &str = "@quickaudit/sync_queue";

    /// Where rejected payloads for `key` are kept for inspection.
    pub fn quarantine(key: &str) -> String {
        format!("{key}.quarantine")
    }
}

/// Typed façade over a [`KeyValueStore`].
#[derive(Clone)]
pub struct LocalData {
    store: Arc<dyn KeyValueStore>,
}

impl LocalData {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        LocalData { store }
    }

    /// The underlying raw store.
    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Decode the value under `key`, quarantining it if unreadable.
    pub(crate) fn load<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(key, error = %e, "unreadable record, moving to quarantine");
                self.quarantine(key, &raw)?;
                Ok(None)
            }
        }
    }

    pub(crate) fn put<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StoreResult<()> {
        let json = serde_json::to_string(value)?;
        self.store.set(key, &json)
    }

    /// Keep the rejected payload and drop it from the live key.
    fn quarantine(&self, key: &str, raw: &str) -> StoreResult<()> {
        self.store.set(&keys::quarantine(key), raw)?;
        self.store.delete(key)
    }

    /// Keep records rejected from the collection under `key`. The live key is
    /// left to the caller, who rewrites it with the records that survived.
    pub(crate) fn quarantine_records(
        &self,
        key: &str,
        rejected: &[serde_json::Value],
    ) -> StoreResult<()> {
        warn!(key, count = rejected.len(), "quarantining records");
        let raw = serde_json::to_string(rejected)?;
        self.store.set(&keys::quarantine(key), &raw)
    }

    /// The most recently quarantined payload for `key`, if any.
    pub fn quarantined(&self, key: &str) -> StoreResult<Option<String>> {
        self.store.get(&keys::quarantine(key))
    }

    // Audits

    /// All locally stored audits, in stored order.
    ///
    /// Records that fail to decode or validate are quarantined individually;
    /// the rest are returned and written back without them.
    pub fn audits(&self) -> StoreResult<Vec<Audit>> {
        let Some(values) = self.load::<Vec<serde_json::Value>>(keys::AUDITS)? else {
            return Ok(Vec::new());
        };

        let mut audits = Vec::with_capacity(values.len());
        let mut rejected = Vec::new();
        for value in values {
            match serde_json::from_value::<Audit>(value.clone()) {
                Ok(audit) => match audit.validate() {
                    Ok(()) => audits.push(audit),
                    Err(e) => {
                        warn!(audit_id = %audit.id, error = %e, "invalid audit record");
                        rejected.push(value);
                    }
                },
                Err(e) => {
                    warn!(error = %e, "undecodable audit record");
                    rejected.push(value);
                }
            }
        }

        if !rejected.is_empty() {
            self.quarantine_records(keys::AUDITS, &rejected)?;
            self.put(keys::AUDITS, &audits)?;
        }

        Ok(audits)
    }

    /// Replace the whole audit collection.
    pub fn save_audits(&self, audits: &[Audit]) -> StoreResult<()> {
        for audit in audits {
            audit.validate()?;
        }
        self.put(keys::AUDITS, audits)
    }

    pub fn audit(&self, id: &str) -> StoreResult<Option<Audit>> {
        Ok(self.audits()?.into_iter().find(|a| a.id == id))
    }

    /// Insert an audit, replacing any record with the same id.
    pub fn add_audit(&self, audit: &Audit) -> StoreResult<()> {
        audit.validate()?;
        let mut audits = self.audits()?;
        match audits.iter_mut().find(|a| a.id == audit.id) {
            Some(existing) => *existing = audit.clone(),
            None => audits.push(audit.clone()),
        }
        self.put(keys::AUDITS, &audits)
    }

    /// Overwrite an existing audit. Returns false if no record has its id.
    pub fn update_audit(&self, audit: &Audit) -> StoreResult<bool> {
        audit.validate()?;
        let mut audits = self.audits()?;
        let Some(existing) = audits.iter_mut().find(|a| a.id == audit.id) else {
            return Ok(false);
        };
        *existing = audit.clone();
        self.put(keys::AUDITS, &audits)?;
        Ok(true)
    }

    /// Swap the record stored under `old_id` for `audit`, keeping its
    /// position. Used when the server assigns a canonical id.
    pub fn replace_audit(&self, old_id: &str, audit: &Audit) -> StoreResult<bool> {
        audit.validate()?;
        let mut audits = self.audits()?;
        let Some(index) = audits.iter().position(|a| a.id == old_id) else {
            return Ok(false);
        };
        audits[index] = audit.clone();
        // The canonical id may already be present from an earlier pull.
        let mut seen = false;
        audits.retain(|a| {
            if a.id != audit.id {
                return true;
            }
            let keep = !seen;
            seen = true;
            keep
        });
        debug!(old_id, new_id = %audit.id, "re-keyed local audit");
        self.put(keys::AUDITS, &audits)?;
        Ok(true)
    }

    /// Remove an audit. Returns false if it was not stored.
    pub fn delete_audit(&self, id: &str) -> StoreResult<bool> {
        let mut audits = self.audits()?;
        let before = audits.len();
        audits.retain(|a| a.id != id);
        if audits.len() == before {
            return Ok(false);
        }
        self.put(keys::AUDITS, &audits)?;
        Ok(true)
    }

    // User

    pub fn user(&self) -> StoreResult<Option<User>> {
        self.load(keys::USER)
    }

    pub fn save_user(&self, user: &User) -> StoreResult<()> {
        self.put(keys::USER, user)
    }

    pub fn clear_user(&self) -> StoreResult<()> {
        self.store.delete(keys::USER)
    }

    // Auth token

    pub fn auth_token(&self) -> StoreResult<Option<String>> {
        self.load(keys::AUTH_TOKEN)
    }

    pub fn save_auth_token(&self, token: &str) -> StoreResult<()> {
        self.put(keys::AUTH_TOKEN, token)
    }

    pub fn clear_auth_token(&self) -> StoreResult<()> {
        self.store.delete(keys::AUTH_TOKEN)
    }

    // Settings

    /// Stored settings, or defaults when none are stored.
    pub fn settings(&self) -> StoreResult<Settings> {
        Ok(self.load(keys::SETTINGS)?.unwrap_or_default())
    }

    pub fn save_settings(&self, settings: &Settings) -> StoreResult<()> {
        self.put(keys::SETTINGS, settings)
    }

    /// Remove every record, including the sync queue.
    pub fn clear_all(&self) -> StoreResult<()> {
        self.store.clear()
    }
}
