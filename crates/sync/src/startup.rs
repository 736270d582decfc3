// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Ordered startup pipeline.
//!
//! Stages run in order and each one either succeeds or stops startup with a
//! [`StartupError`] naming the stage:
//!
//! 1. [`Stage::OpenStore`]: create the data directory and open the SQLite store
//! 2. [`Stage::RestoreSession`]: read the saved token and user
//! 3. [`Stage::BuildClient`]: build the HTTP client for the configured API
//! 4. [`Stage::InitialSync`]: one `AppStart` cycle, skipped without a session
//!
//! Per-entry sync failures are not startup failures. A rejected session is:
//! the stored token is cleared and the error is reported for `InitialSync`.

use std::fmt;
use std::sync::Arc;

use qa_core::User;
use tracing::{debug, info, warn};

use crate::api::{ApiError, HttpApiClient};
use crate::config::Config;
use crate::service::{SyncError, SyncOutcome, SyncService, SyncTrigger};
use crate::store::{KeyValueStore, LocalData, SqliteStore, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    OpenStore,
    RestoreSession,
    BuildClient,
    InitialSync,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::OpenStore => "open store",
            Stage::RestoreSession => "restore session",
            Stage::BuildClient => "build client",
            Stage::InitialSync => "initial sync",
        };
        write!(f, "{name}")
    }
}

/// What went wrong inside a stage.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Sync(#[from] SyncError),
}

/// A stage failed; later stages did not run.
#[derive(Debug, thiserror::Error)]
#[error("startup failed during {stage}: {source}")]
pub struct StartupError {
    pub stage: Stage,
    #[source]
    pub source: StageError,
}

impl StartupError {
    fn at(stage: Stage) -> impl FnOnce(StageError) -> StartupError {
        move |source| StartupError { stage, source }
    }

    /// True when the server rejected the saved session.
    pub fn is_auth(&self) -> bool {
        matches!(self.source, StageError::Sync(SyncError::Auth))
    }
}

/// A restored login.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    /// The profile saved at login, if still present.
    pub user: Option<User>,
}

/// Everything a command needs once startup is done.
pub struct App {
    pub config: Config,
    pub data: LocalData,
    pub session: Option<Session>,
    pub client: HttpApiClient,
    pub service: Arc<SyncService<HttpApiClient>>,
    /// Result of the initial sync, `None` when it was skipped.
    pub initial_sync: Option<SyncOutcome>,
}

/// Run every stage, including the initial sync.
pub async fn bootstrap(config: Config) -> Result<App, StartupError> {
    let mut app = open(config)?;
    app.initial_sync = initial_sync(&app).await?;
    Ok(app)
}

/// Run the local stages only. No network traffic happens here.
pub fn open(config: Config) -> Result<App, StartupError> {
    let store = open_store(&config).map_err(StartupError::at(Stage::OpenStore))?;
    open_with_store(config, store)
}

/// [`open`] over an already opened store.
pub fn open_with_store(
    config: Config,
    store: Arc<dyn KeyValueStore>,
) -> Result<App, StartupError> {
    let data = LocalData::new(Arc::clone(&store));

    let session = restore_session(&data).map_err(StartupError::at(Stage::RestoreSession))?;
    debug!(signed_in = session.is_some(), "session restored");

    let mut client = HttpApiClient::new(&config.api_url, config.request_timeout())
        .map_err(|e| StartupError::at(Stage::BuildClient)(e.into()))?;
    if let Some(ref session) = session {
        client = client.with_token(session.token.clone());
    }
    debug!(api_url = %client.base_url(), "client ready");

    let service = SyncService::new(Arc::new(client.clone()), store)
        .with_request_timeout(config.request_timeout());

    Ok(App {
        config,
        data,
        session,
        client,
        service: Arc::new(service),
        initial_sync: None,
    })
}

fn open_store(config: &Config) -> Result<Arc<dyn KeyValueStore>, StageError> {
    std::fs::create_dir_all(&config.data_dir).map_err(StoreError::from)?;
    let store = SqliteStore::open(&config.db_path())?;
    info!(path = %config.db_path().display(), "store opened");
    Ok(Arc::new(store))
}

fn restore_session(data: &LocalData) -> Result<Option<Session>, StageError> {
    let Some(token) = data.auth_token()? else {
        return Ok(None);
    };
    let user = data.user()?;
    Ok(Some(Session { token, user }))
}

async fn initial_sync(app: &App) -> Result<Option<SyncOutcome>, StartupError> {
    if app.session.is_none() {
        info!("not signed in, skipping initial sync");
        return Ok(None);
    }
    match app.service.sync(SyncTrigger::AppStart).await {
        Ok(outcome) => Ok(Some(outcome)),
        Err(SyncError::Auth) => {
            warn!("saved session rejected, clearing token");
            app.data
                .clear_auth_token()
                .map_err(|e| StartupError::at(Stage::InitialSync)(e.into()))?;
            Err(StartupError::at(Stage::InitialSync)(SyncError::Auth.into()))
        }
        Err(e) => Err(StartupError::at(Stage::InitialSync)(e.into())),
    }
}

#[cfg(test)]
#[path = "startup_tests.rs"]
mod tests;
