// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Pending local mutations waiting in the sync queue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::audit::Audit;
use crate::error::{Error, Result};

/// The kind of write a queued change performs on the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// `POST /audits`
    Create,
    /// `PUT /audits/:id`
    Update,
    /// `DELETE /audits/:id`
    Delete,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Create => "create",
            ChangeKind::Update => "update",
            ChangeKind::Delete => "delete",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ChangeKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "create" => Ok(ChangeKind::Create),
            "update" => Ok(ChangeKind::Update),
            "delete" => Ok(ChangeKind::Delete),
            _ => Err(Error::InvalidChangeKind(s.to_string())),
        }
    }
}

/// A sync queue entry: one local mutation of an audit not yet acknowledged
/// by the server.
///
/// `seq` is assigned by the queue and increases monotonically on a device.
/// Create and update entries snapshot the audit as it was when queued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub seq: u64,
    pub kind: ChangeKind,
    pub audit_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audit: Option<Audit>,
    pub queued_at: DateTime<Utc>,
}

impl Change {
    /// A create or update carrying the audit state to upload.
    pub fn write(seq: u64, kind: ChangeKind, audit: Audit) -> Self {
        Change {
            seq,
            kind,
            audit_id: audit.id.clone(),
            audit: Some(audit),
            queued_at: Utc::now(),
        }
    }

    /// A delete of the given audit id.
    pub fn delete(seq: u64, audit_id: impl Into<String>) -> Self {
        Change {
            seq,
            kind: ChangeKind::Delete,
            audit_id: audit_id.into(),
            audit: None,
            queued_at: Utc::now(),
        }
    }

    /// Create and update entries must carry the audit they upload.
    pub fn validate(&self) -> Result<()> {
        match (self.kind, &self.audit) {
            (ChangeKind::Delete, _) => Ok(()),
            (_, Some(audit)) if audit.id == self.audit_id => audit.validate(),
            (_, Some(audit)) => Err(Error::InvalidInput(format!(
                "change {} targets {} but carries audit {}",
                self.seq, self.audit_id, audit.id
            ))),
            (kind, None) => Err(Error::InvalidInput(format!(
                "{kind} change {} has no audit payload",
                self.seq
            ))),
        }
    }
}

#[cfg(test)]
#[path = "change_tests.rs"]
mod tests;
