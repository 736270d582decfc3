// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for qa-core operations.

use thiserror::Error;

/// All possible errors that can occur when building or validating records.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid audit status: '{0}'\n  hint: valid statuses are: draft, in_progress, completed, approved, rejected")]
    InvalidAuditStatus(String),

    #[error("invalid severity: '{0}'\n  hint: valid severities are: low, medium, high, critical")]
    InvalidSeverity(String),

    #[error("invalid finding status: '{0}'\n  hint: valid statuses are: open, in_progress, resolved")]
    InvalidFindingStatus(String),

    #[error("invalid role: '{0}'\n  hint: valid roles are: admin, supervisor, auditor")]
    InvalidRole(String),

    #[error("invalid plan: '{0}'\n  hint: valid plans are: basic, pro, enterprise")]
    InvalidPlan(String),

    #[error("invalid billing cycle: '{0}'\n  hint: valid cycles are: monthly, annual")]
    InvalidBillingCycle(String),

    #[error("invalid subscription status: '{0}'\n  hint: valid statuses are: active, cancelled, expired")]
    InvalidSubscriptionStatus(String),

    #[error("invalid change kind: '{0}'\n  hint: valid kinds are: create, update, delete")]
    InvalidChangeKind(String),

    #[error("duplicate finding id '{finding_id}' in audit {audit_id}")]
    DuplicateFinding {
        audit_id: String,
        finding_id: String,
    },

    #[error("finding not found: {finding_id} (audit {audit_id})")]
    FindingNotFound {
        audit_id: String,
        finding_id: String,
    },

    #[error("{0}")]
    InvalidInput(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for qa-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
