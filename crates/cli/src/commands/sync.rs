// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `qa sync`, `qa status` and `qa watch`.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use qa_sync::{
    App, Config, HealthProbe, NetworkMonitor, SyncError, SyncOutcome, SyncPhase, SyncReport,
    SyncStatus, SyncTrigger,
};
use serde_json::json;
use tracing::info;

use crate::cli::OutputFormat;
use crate::display::{format_report, format_status};
use crate::error::{Error, Result};

use super::{load_config, print_json, require_session, runtime};

fn report_json(report: &SyncReport) -> serde_json::Value {
    json!({
        "trigger": report.trigger.as_str(),
        "started_at": report.started_at,
        "finished_at": report.finished_at,
        "acknowledged": report.acknowledged,
        "superseded": report.superseded,
        "failures": report.failures.iter().map(|f| json!({
            "seq": f.seq,
            "kind": f.kind.as_str(),
            "audit_id": f.audit_id,
            "error": f.error.to_string(),
        })).collect::<Vec<_>>(),
        "pulled": report.pulled,
        "removed_stale": report.removed_stale,
        "pull_error": report.pull_error.as_ref().map(|e| e.to_string()),
    })
}

/// Run one user-requested cycle. A rejected session clears the saved token.
pub(crate) async fn sync_now(app: &App) -> Result<SyncOutcome> {
    require_session(app)?;
    match app.service.sync(SyncTrigger::UserRefresh).await {
        Ok(outcome) => Ok(outcome),
        Err(SyncError::Auth) => {
            app.data.clear_auth_token()?;
            Err(SyncError::Auth.into())
        }
        Err(e) => Err(e.into()),
    }
}

pub fn run_sync(app: &App, output: OutputFormat) -> Result<()> {
    let outcome = runtime()?.block_on(sync_now(app))?;
    match (outcome, output) {
        (SyncOutcome::Completed(report), OutputFormat::Json) => print_json(&report_json(&report)),
        (SyncOutcome::Completed(report), OutputFormat::Text) => {
            println!("{}", format_report(&report));
            Ok(())
        }
        (SyncOutcome::AlreadyRunning, _) => {
            println!("A sync is already running");
            Ok(())
        }
        (SyncOutcome::OfflineMode, _) => {
            println!("Offline mode is on; sync skipped");
            Ok(())
        }
    }
}

pub fn run_status(app: &App, output: OutputFormat) -> Result<()> {
    app.service.refresh_status()?;
    let status = app.service.status();
    let settings = app.data.settings()?;
    let signed_in = app
        .session
        .as_ref()
        .and_then(|s| s.user.as_ref())
        .map(|u| u.email.as_str());
    match output {
        OutputFormat::Json => print_json(&json!({
            "signed_in": app.session.is_some(),
            "user": signed_in,
            "pending": status.pending,
            "last_sync_at": status.last_sync_at,
            "last_sync_failed": status.last_sync_failed,
            "offline_mode": settings.offline_mode,
            "auto_sync": settings.auto_sync,
            "sync_interval_minutes": settings.sync_interval_minutes,
        })),
        OutputFormat::Text => {
            let signed_in = match (app.session.as_ref(), signed_in) {
                (Some(_), Some(email)) => Some(email),
                (Some(_), None) => Some("yes"),
                (None, _) => None,
            };
            println!("{}", format_status(&status, &settings, signed_in));
            Ok(())
        }
    }
}

pub fn run_watch(data_dir: Option<&Path>) -> Result<()> {
    let config = load_config(data_dir)?;
    runtime()?.block_on(async {
        let app = start_watch(config).await?;
        watch(app).await
    })
}

/// Run the startup pipeline and print the initial sync, if it ran.
///
/// A rejected session has already cleared the saved token by the time this
/// returns.
pub(crate) async fn start_watch(config: Config) -> Result<App> {
    let app = qa_sync::bootstrap(config).await?;
    require_session(&app)?;
    match app.initial_sync {
        Some(SyncOutcome::Completed(ref report)) => println!("{}", format_report(report)),
        Some(SyncOutcome::OfflineMode) => println!("Offline mode is on; automatic sync paused"),
        Some(SyncOutcome::AlreadyRunning) | None => {}
    }
    Ok(app)
}

/// A line for a cycle that finished since `last_seen`, if any.
///
/// Cycles are told apart by their completion time, so one that starts and
/// ends between two status reads is still reported.
pub(crate) fn finished_cycle(
    last_seen: &mut Option<DateTime<Utc>>,
    status: &SyncStatus,
) -> Option<String> {
    if status.phase != SyncPhase::Idle || status.last_sync_at == *last_seen {
        return None;
    }
    *last_seen = status.last_sync_at;
    Some(match status.last_error {
        Some(ref e) => format!("Sync finished with errors: {e}"),
        None => format!("Synced, {} pending", status.pending),
    })
}

/// Sync on every reconnect and on the settings timer until Ctrl-C.
async fn watch(app: App) -> Result<()> {
    let service = Arc::clone(&app.service);
    let (probe, rx) = HealthProbe::new(
        app.client.clone(),
        app.config.probe_interval(),
        app.config.probe_timeout(),
    );

    // The monitor treats the connectivity it starts with as already seen.
    if !probe.probe_once().await.is_online() {
        println!("Server unreachable; changes stay queued until it is back");
    }

    let monitor = tokio::spawn(NetworkMonitor::new(rx).run(Arc::clone(&service)));
    let prober = tokio::spawn(probe.run());
    let mut status = service.subscribe();
    let mut last_seen = status.borrow_and_update().last_sync_at;

    let periodic = service.run_periodic();
    tokio::pin!(periodic);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    println!("Watching for changes (Ctrl-C to stop)");
    let result = loop {
        tokio::select! {
            _ = &mut ctrl_c => break Ok(()),
            res = &mut periodic => break res.map_err(Error::from),
            changed = status.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                let current = status.borrow_and_update().clone();
                if let Some(line) = finished_cycle(&mut last_seen, &current) {
                    println!("{line}");
                }
            }
        }
    };

    monitor.abort();
    prober.abort();
    if let Err(ref e) = result {
        if e.is_auth() {
            app.data.clear_auth_token()?;
        }
    }
    info!("watch stopped");
    result
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
