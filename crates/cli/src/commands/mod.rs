// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod audit;
pub mod auth;
pub mod finding;
pub mod settings;
pub mod subscription;
pub mod sync;

#[cfg(test)]
pub(crate) mod testing;

use std::path::Path;

use qa_core::Audit;
use qa_sync::{App, Config, LocalData, Session};
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Load the config for the data directory.
pub fn load_config(data_dir: Option<&Path>) -> Result<Config> {
    let dir = Config::resolve_data_dir(data_dir)?;
    debug!(data_dir = %dir.display(), "loading config");
    Ok(Config::load(&dir)?)
}

/// Load the config and run the local startup stages.
pub fn open_app(data_dir: Option<&Path>) -> Result<App> {
    Ok(qa_sync::open(load_config(data_dir)?)?)
}

/// Single-threaded runtime for the commands that talk to the server.
pub(crate) fn runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}

pub(crate) fn require_session(app: &App) -> Result<&Session> {
    app.session.as_ref().ok_or(Error::NotSignedIn)
}

/// Resolve an audit by exact id or unique id prefix.
pub(crate) fn resolve_audit(data: &LocalData, id: &str) -> Result<Audit> {
    let audits = data.audits()?;
    if let Some(audit) = audits.iter().find(|a| a.id == id) {
        return Ok(audit.clone());
    }
    let mut matches: Vec<Audit> = audits
        .into_iter()
        .filter(|a| a.id.starts_with(id))
        .collect();
    match matches.len() {
        0 => Err(Error::AuditNotFound(id.to_string())),
        1 => Ok(matches.remove(0)),
        _ => Err(Error::AmbiguousId {
            prefix: id.to_string(),
            matches: matches.into_iter().map(|a| a.id).collect(),
        }),
    }
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
