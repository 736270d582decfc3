// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `qa audit` subcommands.
//!
//! Every mutation goes through the sync service, which writes the local
//! store and queues the change in one step. Nothing here needs a network.

use qa_core::{Audit, AuditFilter, AuditStatus};
use qa_sync::App;
use tracing::info;

use crate::cli::{AuditCommand, AuditFieldArgs, OutputFormat};
use crate::display::{format_audit_details, format_audit_line};
use crate::error::{Error, Result};

use super::{print_json, resolve_audit};

pub fn run(app: &App, command: AuditCommand) -> Result<()> {
    match command {
        AuditCommand::New {
            title,
            location,
            fields,
            output,
        } => {
            let audit = create(app, &title, &location, &fields)?;
            if output.as_deref() == Some("id") {
                println!("{}", audit.id);
            } else {
                println!("Created audit {}: {}", audit.id, audit.title);
            }
            Ok(())
        }
        AuditCommand::List { filter, output } => {
            let audits = list(app, &filter.to_filter())?;
            match output {
                OutputFormat::Json => print_json(&audits),
                OutputFormat::Text => {
                    if audits.is_empty() {
                        println!("No audits");
                    }
                    for audit in &audits {
                        println!("{}", format_audit_line(audit));
                    }
                    Ok(())
                }
            }
        }
        AuditCommand::Show { id, output } => {
            let audit = resolve_audit(&app.data, &id)?;
            match output {
                OutputFormat::Json => print_json(&audit),
                OutputFormat::Text => {
                    println!("{}", format_audit_details(&audit));
                    Ok(())
                }
            }
        }
        AuditCommand::Edit {
            id,
            title,
            location,
            status,
            fields,
        } => {
            let edit = AuditEdit {
                title,
                location,
                status,
                fields,
            };
            let audit = edit_audit(app, &id, &edit)?;
            println!("Updated audit {}", audit.id);
            Ok(())
        }
        AuditCommand::Rm { id } => {
            let audit = remove(app, &id)?;
            println!("Deleted audit {}: {}", audit.id, audit.title);
            Ok(())
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn apply_fields(audit: &mut Audit, fields: &AuditFieldArgs) {
    if let Some(assignee) = non_empty(&fields.assignee) {
        audit.assigned_to = Some(assignee);
    }
    if let Some(due) = non_empty(&fields.due) {
        audit.due_date = Some(due);
    }
    if let Some(notes) = non_empty(&fields.notes) {
        audit.notes = Some(notes);
    }
    if let Some(template) = non_empty(&fields.template) {
        audit.template = Some(template);
    }
    if let Some(category) = non_empty(&fields.category) {
        audit.category = Some(category);
    }
    for tag in fields.tag.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        if !audit.tags.iter().any(|existing| existing == tag) {
            audit.tags.push(tag.to_string());
        }
    }
}

pub(crate) fn create(
    app: &App,
    title: &str,
    location: &str,
    fields: &AuditFieldArgs,
) -> Result<Audit> {
    let mut audit = Audit::new(title.trim(), location.trim());
    apply_fields(&mut audit, fields);
    audit.validate()?;
    app.service.create_audit(&audit)?;
    info!(audit_id = %audit.id, "audit created");
    Ok(audit)
}

pub(crate) fn list(app: &App, filter: &AuditFilter) -> Result<Vec<Audit>> {
    let mut audits: Vec<Audit> = app
        .data
        .audits()?
        .into_iter()
        .filter(|a| filter.matches(a))
        .collect();
    audits.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(audits)
}

/// Field changes for `audit edit`. Unset fields are left alone.
#[derive(Debug, Default)]
pub(crate) struct AuditEdit {
    pub title: Option<String>,
    pub location: Option<String>,
    pub status: Option<AuditStatus>,
    pub fields: AuditFieldArgs,
}

impl AuditEdit {
    fn is_empty(&self) -> bool {
        let f = &self.fields;
        self.title.is_none()
            && self.location.is_none()
            && self.status.is_none()
            && f.assignee.is_none()
            && f.due.is_none()
            && f.notes.is_none()
            && f.template.is_none()
            && f.category.is_none()
            && f.tag.is_empty()
    }
}

/// Only supervisors and admins may approve or reject.
fn check_review(app: &App, status: AuditStatus) -> Result<()> {
    if !status.is_reviewed() {
        return Ok(());
    }
    let user = app
        .session
        .as_ref()
        .and_then(|s| s.user.as_ref())
        .ok_or(Error::NotSignedIn)?;
    if user.role.can_review() {
        Ok(())
    } else {
        Err(Error::ReviewNotAllowed {
            role: user.role.to_string(),
            status: status.to_string(),
        })
    }
}

pub(crate) fn edit_audit(app: &App, id: &str, edit: &AuditEdit) -> Result<Audit> {
    if edit.is_empty() {
        return Err(Error::NothingToEdit);
    }
    let mut audit = resolve_audit(&app.data, id)?;
    if let Some(status) = edit.status {
        check_review(app, status)?;
        audit.status = status;
    }
    if let Some(title) = non_empty(&edit.title) {
        audit.title = title;
    }
    if let Some(location) = non_empty(&edit.location) {
        audit.location = location;
    }
    apply_fields(&mut audit, &edit.fields);
    audit.validate()?;
    app.service.save_audit(&audit)?;
    info!(audit_id = %audit.id, "audit updated");
    Ok(audit)
}

pub(crate) fn remove(app: &App, id: &str) -> Result<Audit> {
    let audit = resolve_audit(&app.data, id)?;
    app.service.delete_audit(&audit.id)?;
    info!(audit_id = %audit.id, "audit deleted");
    Ok(audit)
}

#[cfg(test)]
#[path = "audit_tests.rs"]
mod tests;
