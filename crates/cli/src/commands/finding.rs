// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use qa_core::{Finding, FindingStatus, Severity};
use qa_sync::App;
use tracing::info;

use crate::cli::FindingCommand;
use crate::display::short_id;
use crate::error::{Error, Result};

use super::resolve_audit;

pub fn run(app: &App, command: FindingCommand) -> Result<()> {
    match command {
        FindingCommand::Add {
            audit,
            title,
            severity,
            description,
            location,
            assignee,
            due,
            notes,
            photos,
        } => {
            let draft = NewFinding {
                title,
                severity,
                description,
                location,
                assignee,
                due,
                notes,
                photos,
            };
            let (audit_id, finding) = add(app, &audit, draft)?;
            println!(
                "Added finding {} to audit {}",
                finding.id,
                short_id(&audit_id)
            );
            Ok(())
        }
        FindingCommand::Edit {
            audit,
            finding,
            title,
            severity,
            status,
            description,
            notes,
            photos,
            remove_photos,
        } => {
            let change = FindingEdit {
                title,
                severity,
                status,
                description,
                notes,
                photos,
                remove_photos,
            };
            let finding = edit(app, &audit, &finding, change)?;
            println!(
                "Updated finding {}: [{}] ({}) {}",
                finding.id, finding.severity, finding.status, finding.title
            );
            Ok(())
        }
        FindingCommand::Rm { audit, finding } => {
            let finding = remove(app, &audit, &finding)?;
            println!("Removed finding {}: {}", finding.id, finding.title);
            Ok(())
        }
        FindingCommand::Resolve {
            audit,
            finding,
            notes,
        } => {
            let finding = resolve(app, &audit, &finding, notes)?;
            println!("Resolved finding {}: {}", finding.id, finding.title);
            Ok(())
        }
    }
}

#[derive(Debug)]
pub(crate) struct NewFinding {
    pub title: String,
    pub severity: Severity,
    pub description: Option<String>,
    pub location: Option<String>,
    pub assignee: Option<String>,
    pub due: Option<String>,
    pub notes: Option<String>,
    pub photos: Vec<String>,
}

/// Fields to change on an existing finding. `None` leaves a field as is.
#[derive(Debug, Default)]
pub(crate) struct FindingEdit {
    pub title: Option<String>,
    pub severity: Option<Severity>,
    pub status: Option<FindingStatus>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub photos: Vec<String>,
    pub remove_photos: Vec<String>,
}

impl FindingEdit {
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.severity.is_none()
            && self.status.is_none()
            && self.description.is_none()
            && self.notes.is_none()
            && self.photos.is_empty()
            && self.remove_photos.is_empty()
    }
}

fn attach_photos(finding: &mut Finding, photos: Vec<String>) {
    for photo in photos {
        let photo = photo.trim().to_string();
        if !finding.photos.contains(&photo) {
            finding.photos.push(photo);
        }
    }
}

pub(crate) fn add(app: &App, audit_id: &str, draft: NewFinding) -> Result<(String, Finding)> {
    let mut audit = resolve_audit(&app.data, audit_id)?;
    let mut finding = Finding::new(draft.title.trim(), draft.severity);
    finding.description = draft.description.unwrap_or_default();
    finding.location = draft.location;
    finding.assigned_to = draft.assignee;
    finding.due_date = draft.due;
    finding.notes = draft.notes;
    attach_photos(&mut finding, draft.photos);

    audit.add_finding(finding.clone())?;
    app.service.save_audit(&audit)?;
    info!(audit_id = %audit.id, finding_id = %finding.id, "finding added");
    Ok((audit.id, finding))
}

pub(crate) fn edit(
    app: &App,
    audit_id: &str,
    finding_id: &str,
    change: FindingEdit,
) -> Result<Finding> {
    if change.is_empty() {
        return Err(Error::NothingToEdit);
    }
    let mut audit = resolve_audit(&app.data, audit_id)?;
    let finding = audit.finding_mut(finding_id)?;
    if let Some(title) = change.title {
        finding.title = title.trim().to_string();
    }
    if let Some(severity) = change.severity {
        finding.severity = severity;
    }
    if let Some(status) = change.status {
        finding.status = status;
    }
    if let Some(description) = change.description {
        finding.description = description;
    }
    if change.notes.is_some() {
        finding.notes = change.notes;
    }
    finding
        .photos
        .retain(|photo| !change.remove_photos.contains(photo));
    attach_photos(finding, change.photos);
    let updated = finding.clone();

    app.service.save_audit(&audit)?;
    info!(audit_id = %audit.id, finding_id = %updated.id, "finding updated");
    Ok(updated)
}

pub(crate) fn remove(app: &App, audit_id: &str, finding_id: &str) -> Result<Finding> {
    let mut audit = resolve_audit(&app.data, audit_id)?;
    let removed = audit.remove_finding(finding_id)?;
    app.service.save_audit(&audit)?;
    info!(audit_id = %audit.id, finding_id = %removed.id, "finding removed");
    Ok(removed)
}

pub(crate) fn resolve(
    app: &App,
    audit_id: &str,
    finding_id: &str,
    notes: Option<String>,
) -> Result<Finding> {
    let mut audit = resolve_audit(&app.data, audit_id)?;
    let finding = audit.finding_mut(finding_id)?;
    finding.status = FindingStatus::Resolved;
    if notes.is_some() {
        finding.notes = notes;
    }
    let resolved = finding.clone();

    app.service.save_audit(&audit)?;
    info!(audit_id = %audit.id, finding_id = %resolved.id, "finding resolved");
    Ok(resolved)
}

#[cfg(test)]
#[path = "finding_tests.rs"]
mod tests;
