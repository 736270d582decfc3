// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Audit and finding records.
//!
//! An [`Audit`] is owned by the user who created it and carries an ordered
//! list of [`Finding`]s. Findings cannot outlive their audit and their ids are
//! unique within it. Audit ids are client-generated UUIDs until the server
//! hands back a canonical one on first sync.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Workflow status of an audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    /// Created on the device, not yet started.
    Draft,
    /// Auditor is walking the site.
    InProgress,
    /// Auditor has finished and submitted for review.
    Completed,
    /// Supervisor accepted the audit.
    Approved,
    /// Supervisor sent the audit back.
    Rejected,
}

impl AuditStatus {
    /// Returns the string representation used in storage and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditStatus::Draft => "draft",
            AuditStatus::InProgress => "in_progress",
            AuditStatus::Completed => "completed",
            AuditStatus::Approved => "approved",
            AuditStatus::Rejected => "rejected",
        }
    }

    /// Returns true once a supervisor has reviewed the audit.
    pub fn is_reviewed(&self) -> bool {
        matches!(self, AuditStatus::Approved | AuditStatus::Rejected)
    }
}

impl fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AuditStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(AuditStatus::Draft),
            "in_progress" | "in-progress" => Ok(AuditStatus::InProgress),
            "completed" => Ok(AuditStatus::Completed),
            "approved" => Ok(AuditStatus::Approved),
            "rejected" => Ok(AuditStatus::Rejected),
            _ => Err(Error::InvalidAuditStatus(s.to_string())),
        }
    }
}

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Severity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" | "med" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            _ => Err(Error::InvalidSeverity(s.to_string())),
        }
    }
}

/// Remediation status of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingStatus {
    Open,
    InProgress,
    Resolved,
}

impl FindingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingStatus::Open => "open",
            FindingStatus::InProgress => "in_progress",
            FindingStatus::Resolved => "resolved",
        }
    }
}

impl fmt::Display for FindingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FindingStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "open" => Ok(FindingStatus::Open),
            "in_progress" | "in-progress" => Ok(FindingStatus::InProgress),
            "resolved" => Ok(FindingStatus::Resolved),
            _ => Err(Error::InvalidFindingStatus(s.to_string())),
        }
    }
}

/// A single observation or defect recorded during an audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    /// Unique within the parent audit.
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub severity: Severity,
    pub status: FindingStatus,
    pub created_at: DateTime<Utc>,
    /// Photo references (device URIs or uploaded file ids).
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    /// ISO-8601 date as entered by the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Finding {
    /// Creates an open finding with a fresh id.
    pub fn new(title: impl Into<String>, severity: Severity) -> Self {
        Finding {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            description: String::new(),
            severity,
            status: FindingStatus::Open,
            created_at: Utc::now(),
            photos: Vec::new(),
            location: None,
            assigned_to: None,
            due_date: None,
            notes: None,
        }
    }
}

/// An audit of a site or process, with its findings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Audit {
    /// Globally unique; client-generated UUID until the server assigns one.
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    pub location: String,
    pub status: AuditStatus,
    pub created_at: DateTime<Utc>,
    /// Ordered as recorded.
    #[serde(default)]
    pub findings: Vec<Finding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Audit {
    /// Creates a draft audit with a client-generated UUID.
    pub fn new(title: impl Into<String>, location: impl Into<String>) -> Self {
        Audit {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            location: location.into(),
            status: AuditStatus::Draft,
            created_at: Utc::now(),
            findings: Vec::new(),
            assigned_to: None,
            due_date: None,
            notes: None,
            template: None,
            category: None,
            tags: Vec::new(),
        }
    }

    /// Checks the record-level invariants: non-empty title and finding ids
    /// unique within this audit.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::InvalidInput("audit id cannot be empty".to_string()));
        }
        if self.title.trim().is_empty() {
            return Err(Error::InvalidInput(format!(
                "audit {} has an empty title",
                self.id
            )));
        }
        let mut seen = std::collections::HashSet::new();
        for finding in &self.findings {
            if !seen.insert(finding.id.as_str()) {
                return Err(Error::DuplicateFinding {
                    audit_id: self.id.clone(),
                    finding_id: finding.id.clone(),
                });
            }
        }
        Ok(())
    }

    /// Appends a finding, rejecting an id already present in this audit.
    pub fn add_finding(&mut self, finding: Finding) -> Result<()> {
        if self.findings.iter().any(|f| f.id == finding.id) {
            return Err(Error::DuplicateFinding {
                audit_id: self.id.clone(),
                finding_id: finding.id,
            });
        }
        self.findings.push(finding);
        Ok(())
    }

    /// Looks up a finding by exact id or unique id prefix.
    pub fn finding_mut(&mut self, finding_id: &str) -> Result<&mut Finding> {
        let index = self.finding_index(finding_id)?;
        Ok(&mut self.findings[index])
    }

    /// Removes a finding by exact id or unique id prefix and returns it.
    pub fn remove_finding(&mut self, finding_id: &str) -> Result<Finding> {
        let index = self.finding_index(finding_id)?;
        Ok(self.findings.remove(index))
    }

    fn finding_index(&self, finding_id: &str) -> Result<usize> {
        let mut matches = self
            .findings
            .iter()
            .enumerate()
            .filter(|(_, f)| f.id.starts_with(finding_id))
            .map(|(i, _)| i);
        let not_found = || Error::FindingNotFound {
            audit_id: self.id.clone(),
            finding_id: finding_id.to_string(),
        };
        match (matches.next(), matches.next()) {
            (Some(i), None) => Ok(i),
            // An exact hit wins over an ambiguous prefix.
            _ => self
                .findings
                .iter()
                .position(|f| f.id == finding_id)
                .ok_or_else(not_found),
        }
    }

    /// Number of findings not yet resolved.
    pub fn open_findings(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.status != FindingStatus::Resolved)
            .count()
    }
}

/// Criteria for listing audits locally.
///
/// All set criteria must match. `tags` requires every listed tag.
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    /// Case-insensitive substring over title, location and notes.
    pub search: Option<String>,
    pub status: Option<AuditStatus>,
    pub assigned_to: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
}

impl AuditFilter {
    pub fn matches(&self, audit: &Audit) -> bool {
        if let Some(status) = self.status {
            if audit.status != status {
                return false;
            }
        }
        if let Some(ref assignee) = self.assigned_to {
            if audit.assigned_to.as_deref() != Some(assignee.as_str()) {
                return false;
            }
        }
        if let Some(ref category) = self.category {
            let hit = audit
                .category
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(category));
            if !hit {
                return false;
            }
        }
        if !self.tags.iter().all(|t| audit.tags.contains(t)) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(query) if !query.is_empty() => {
                let query = query.to_lowercase();
                audit.title.to_lowercase().contains(&query)
                    || audit.location.to_lowercase().contains(&query)
                    || audit
                        .notes
                        .as_deref()
                        .is_some_and(|n| n.to_lowercase().contains(&query))
            }
            _ => true,
        }
    }
}

#[cfg(test)]
#[path = "audit_tests.rs"]
mod tests;
