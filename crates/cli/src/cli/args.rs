// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared argument structs for CLI commands.

use clap::Args;
use qa_core::{AuditFilter, AuditStatus};

/// Filters for `audit list`.
#[derive(Args, Clone, Debug, Default)]
pub struct AuditFilterArgs {
    /// Case-insensitive text search over title, location and notes
    #[arg(long, short = 'q')]
    pub search: Option<String>,

    /// Filter by status (draft, in_progress, completed, approved, rejected)
    #[arg(long, short)]
    pub status: Option<AuditStatus>,

    /// Filter by assignee
    #[arg(long, short)]
    pub assignee: Option<String>,

    /// Filter by category
    #[arg(long, short)]
    pub category: Option<String>,

    /// Require a tag (comma-separated or repeated, all must match)
    #[arg(long, short, value_delimiter = ',')]
    pub tag: Vec<String>,
}

impl AuditFilterArgs {
    pub fn to_filter(&self) -> AuditFilter {
        AuditFilter {
            search: self.search.clone(),
            status: self.status,
            assigned_to: self.assignee.clone(),
            category: self.category.clone(),
            tags: self.tag.clone(),
        }
    }
}

/// Optional audit fields shared by `audit new` and `audit edit`.
#[derive(Args, Clone, Debug, Default)]
pub struct AuditFieldArgs {
    /// Assign the audit to someone
    #[arg(long, short)]
    pub assignee: Option<String>,

    /// Due date (free-form, e.g. 2026-11-01)
    #[arg(long)]
    pub due: Option<String>,

    /// Free-form notes
    #[arg(long)]
    pub notes: Option<String>,

    /// Template the audit was started from
    #[arg(long)]
    pub template: Option<String>,

    /// Category, e.g. "safety"
    #[arg(long, short)]
    pub category: Option<String>,

    /// Tag(s) (comma-separated or repeated)
    #[arg(long, short, value_delimiter = ',')]
    pub tag: Vec<String>,
}
