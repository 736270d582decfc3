// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Account commands: register, login, logout, whoami.
//!
//! A successful login stores the bearer token and the user's profile in the
//! local store. Later commands restore them during startup.

use std::io::BufRead;

use qa_core::{AuthSession, Credentials, Registration, User};
use qa_sync::App;
use tracing::{info, warn};

use crate::cli::OutputFormat;
use crate::display::format_user;
use crate::error::{Error, Result};

use super::{print_json, require_session, runtime};

/// Use the given password or read one line from stdin.
fn password_or_stdin(password: Option<String>) -> Result<String> {
    let password = match password {
        Some(p) => p,
        None => {
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line)?;
            line.trim_end_matches(['\r', '\n']).to_string()
        }
    };
    if password.is_empty() {
        return Err(Error::PasswordRequired);
    }
    Ok(password)
}

pub fn run_register(
    app: &App,
    name: String,
    email: String,
    company: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let registration = Registration {
        name: name.trim().to_string(),
        email: email.trim().to_string(),
        password: password_or_stdin(password)?,
        company: company.filter(|c| !c.trim().is_empty()),
    };
    let session = runtime()?.block_on(register(app, &registration))?;
    println!("Registered and signed in as {}", format_user(&session.user));
    Ok(())
}

pub fn run_login(app: &App, email: String, password: Option<String>) -> Result<()> {
    let credentials = Credentials {
        email: email.trim().to_string(),
        password: password_or_stdin(password)?,
    };
    let session = runtime()?.block_on(login(app, &credentials))?;
    println!("Signed in as {}", format_user(&session.user));
    let pending = app.service.status().pending;
    if pending > 0 {
        println!("{pending} pending change(s) will upload on the next sync");
    }
    Ok(())
}

pub fn run_logout(app: &App) -> Result<()> {
    if app.session.is_none() {
        println!("Not signed in");
        return Ok(());
    }
    runtime()?.block_on(logout(app))?;
    println!("Signed out");
    Ok(())
}

pub fn run_whoami(app: &App, refresh: bool, output: OutputFormat) -> Result<()> {
    let user = if refresh {
        runtime()?.block_on(refresh_profile(app))?
    } else {
        let session = require_session(app)?;
        match &session.user {
            Some(user) => user.clone(),
            None => runtime()?.block_on(refresh_profile(app))?,
        }
    };
    match output {
        OutputFormat::Json => print_json(&user),
        OutputFormat::Text => {
            println!("{}", format_user(&user));
            Ok(())
        }
    }
}

fn save_session(app: &App, session: &AuthSession) -> Result<()> {
    app.data.save_auth_token(&session.token)?;
    app.data.save_user(&session.user)?;
    info!(user_id = %session.user.id, "session saved");
    Ok(())
}

pub(crate) async fn register(app: &App, registration: &Registration) -> Result<AuthSession> {
    registration.validate()?;
    let session = app.client.register(registration).await?;
    save_session(app, &session)?;
    Ok(session)
}

pub(crate) async fn login(app: &App, credentials: &Credentials) -> Result<AuthSession> {
    let session = app.client.login(credentials).await?;
    save_session(app, &session)?;
    Ok(session)
}

/// Tell the server, then forget the session locally even if that failed.
/// Queued changes and local audits are kept.
pub(crate) async fn logout(app: &App) -> Result<()> {
    if let Err(e) = app.client.logout().await {
        warn!(error = %e, "server logout failed, clearing local session anyway");
    }
    app.data.clear_auth_token()?;
    app.data.clear_user()?;
    Ok(())
}

pub(crate) async fn refresh_profile(app: &App) -> Result<User> {
    require_session(app)?;
    let user = match app.client.profile().await {
        Ok(user) => user,
        Err(e) if e.is_auth() => {
            app.data.clear_auth_token()?;
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };
    app.data.save_user(&user)?;
    Ok(user)
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
