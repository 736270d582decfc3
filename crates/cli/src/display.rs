// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use qa_core::{Audit, Finding, Settings, Subscription, User};
use qa_sync::{SyncReport, SyncStatus};

use crate::colors;

/// Length of the id prefix shown in list output.
pub const SHORT_ID_LEN: usize = 8;

pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(SHORT_ID_LEN) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

fn format_time(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

/// Format a single audit line for list output
pub fn format_audit_line(audit: &Audit) -> String {
    let status_display = match &audit.assigned_to {
        Some(assignee) => format!("{}, @{}", audit.status, assignee),
        None => audit.status.to_string(),
    };
    let open = audit.open_findings();
    let findings = if open > 0 {
        format!(" [{open} open]")
    } else {
        String::new()
    };
    format!(
        "- ({}) {}: {} @ {}{}",
        status_display,
        short_id(&audit.id),
        audit.title,
        audit.location,
        findings
    )
}

pub fn format_finding_line(finding: &Finding) -> String {
    let mut line = format!(
        "  - [{}] ({}) {}: {}",
        colors::severity(finding.severity),
        finding.status,
        finding.id,
        finding.title
    );
    if let Some(assignee) = &finding.assigned_to {
        line.push_str(&format!(", @{assignee}"));
    }
    match finding.photos.len() {
        0 => {}
        1 => line.push_str(" [1 photo]"),
        n => line.push_str(&format!(" [{n} photos]")),
    }
    line
}

/// Format audit details for `audit show`
pub fn format_audit_details(audit: &Audit) -> String {
    let mut output = Vec::new();

    output.push(format!("[{}] {}", audit.status, audit.id));
    output.push(format!("Title: {}", audit.title));
    output.push(format!("Location: {}", audit.location));
    if let Some(assignee) = &audit.assigned_to {
        output.push(format!("Assignee: {}", assignee));
    }
    if let Some(category) = &audit.category {
        output.push(format!("Category: {}", category));
    }
    if let Some(template) = &audit.template {
        output.push(format!("Template: {}", template));
    }
    if let Some(due) = &audit.due_date {
        output.push(format!("Due: {}", due));
    }
    output.push(format!("Created: {}", format_time(audit.created_at)));
    if !audit.tags.is_empty() {
        output.push(format!("Tags: {}", audit.tags.join(", ")));
    }

    if let Some(notes) = &audit.notes {
        output.push(String::new());
        output.push("Notes:".to_string());
        for line in notes.lines() {
            output.push(format!("  {}", line));
        }
    }

    if !audit.findings.is_empty() {
        output.push(String::new());
        output.push(format!(
            "Findings ({} open):",
            audit.open_findings()
        ));
        for finding in &audit.findings {
            output.push(format_finding_line(finding));
            if !finding.description.is_empty() {
                output.push(format!("      {}", finding.description));
            }
        }
    }

    output.join("\n")
}

pub fn format_user(user: &User) -> String {
    let mut line = format!("{} <{}> ({})", user.name, user.email, user.role);
    if let Some(company) = &user.company {
        line.push_str(&format!(", {company}"));
    }
    line
}

pub fn format_status(status: &SyncStatus, settings: &Settings, signed_in: Option<&str>) -> String {
    let mut output = Vec::new();
    output.push(format!(
        "Signed in: {}",
        signed_in.unwrap_or("no")
    ));
    output.push(format!("Pending changes: {}", status.pending));
    let last = match status.last_sync_at {
        Some(at) if status.last_sync_failed => format!("{} (with failures)", format_time(at)),
        Some(at) => format_time(at),
        None if status.last_sync_failed => "never (last attempt failed)".to_string(),
        None => "never".to_string(),
    };
    output.push(format!("Last sync: {}", last));
    if settings.offline_mode {
        output.push("Offline mode: on (automatic sync paused)".to_string());
    } else if settings.auto_sync {
        output.push(format!(
            "Auto sync: every {} min",
            settings.sync_interval_minutes
        ));
    } else {
        output.push("Auto sync: off".to_string());
    }
    output.join("\n")
}

/// One-line summary of a completed cycle.
pub fn format_report(report: &SyncReport) -> String {
    let mut parts = vec![format!("{} pushed", report.acknowledged)];
    if report.superseded > 0 {
        parts.push(format!("{} superseded", report.superseded));
    }
    if !report.failures.is_empty() {
        parts.push(format!("{} failed", report.failures.len()));
    }
    match report.pulled {
        Some(n) => parts.push(format!("{n} pulled")),
        None => parts.push("pull skipped".to_string()),
    }
    if report.removed_stale > 0 {
        parts.push(format!("{} removed", report.removed_stale));
    }
    let mut lines = vec![format!("Synced: {}", parts.join(", "))];
    for failure in &report.failures {
        lines.push(format!(
            "  ! {} {}: {}",
            failure.kind,
            short_id(&failure.audit_id),
            failure.error
        ));
    }
    if let Some(e) = &report.pull_error {
        lines.push(format!("  ! pull: {e}"));
    }
    lines.join("\n")
}

pub fn format_subscription(sub: &Subscription) -> String {
    let mut output = vec![
        format!("Plan: {} ({})", sub.plan, sub.billing_cycle),
        format!("Status: {}", sub.status),
        format!("Price: {}", sub.price),
        format!("Renews: {}", sub.renewal_date.format("%Y-%m-%d")),
    ];
    let add_ons = sub.add_ons.enabled();
    if !add_ons.is_empty() {
        output.push(format!("Add-ons: {}", add_ons.join(", ")));
    }
    if let Some(reseller) = &sub.reseller_id {
        output.push(format!("Managed by reseller: {}", reseller));
    }
    output.join("\n")
}

pub fn format_settings(settings: &Settings) -> String {
    let on_off = |b: bool| if b { "on" } else { "off" };
    [
        format!("auto-sync: {}", on_off(settings.auto_sync)),
        format!("sync-interval: {}", settings.sync_interval_minutes),
        format!("notifications: {}", on_off(settings.notifications)),
        format!("offline-mode: {}", on_off(settings.offline_mode)),
    ]
    .join("\n")
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
