// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// All possible errors surfaced by the `qa` commands.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not signed in\n  hint: run 'qa login <email>' first")]
    NotSignedIn,

    #[error("audit not found: {0}\n  hint: run 'qa audit list' to see local audits")]
    AuditNotFound(String),

    #[error("ambiguous audit ID '{prefix}' matches: {}", matches.join(", "))]
    AmbiguousId {
        prefix: String,
        matches: Vec<String>,
    },

    #[error("{role}s cannot mark an audit {status}\n  hint: ask a supervisor or admin to review it")]
    ReviewNotAllowed { role: String, status: String },

    #[error("nothing to change\n  hint: pass at least one field, e.g. --status or --title")]
    NothingToEdit,

    #[error("password required\n  hint: pass --password, set QA_PASSWORD, or type it on stdin")]
    PasswordRequired,

    #[error(transparent)]
    Core(#[from] qa_core::Error),

    #[error(transparent)]
    Store(#[from] qa_sync::StoreError),

    #[error(transparent)]
    Api(#[from] qa_sync::ApiError),

    #[error(transparent)]
    Sync(#[from] qa_sync::SyncError),

    #[error(transparent)]
    Startup(#[from] qa_sync::StartupError),

    #[error(transparent)]
    Config(#[from] qa_sync::ConfigError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True when the server rejected the saved session.
    pub fn is_auth(&self) -> bool {
        match self {
            Error::Api(e) => e.is_auth(),
            Error::Sync(qa_sync::SyncError::Auth) => true,
            Error::Startup(e) => e.is_auth(),
            _ => false,
        }
    }
}

/// A specialized Result type for `qa` commands.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
