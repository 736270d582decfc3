// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! quickaudit - the command-line front end for QuickAudit.
//!
//! Audits and findings are edited against the local store and queued for
//! upload, so every audit command works offline. Commands that need the
//! server (`login`, `sync`, `watch`, `subscription`) run on a
//! single-threaded tokio runtime.
//!
//! Startup follows [`qa_sync::startup`]: the data directory is resolved from
//! `--data-dir`, `QA_DATA_DIR`, or the platform data directory, and the
//! saved session is restored before any command runs.

mod cli;
pub mod colors;
mod commands;
mod display;
pub mod error;

pub use cli::{
    AuditCommand, AuditFieldArgs, AuditFilterArgs, Cli, Command, FindingCommand, OutputFormat,
    SettingsCommand, SubscriptionCommand,
};
pub use error::{Error, Result};

use clap::CommandFactory;
use clap_complete::generate;

/// Run a parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    let Cli {
        data_dir, command, ..
    } = cli;

    if let Command::Completion { shell } = command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "qa", &mut std::io::stdout());
        return Ok(());
    }

    // Watch runs the whole startup pipeline, initial sync included.
    if let Command::Watch = command {
        return commands::sync::run_watch(data_dir.as_deref());
    }

    let app = commands::open_app(data_dir.as_deref())?;
    match command {
        Command::Register {
            name,
            email,
            company,
            password,
        } => commands::auth::run_register(&app, name, email, company, password),
        Command::Login { email, password } => commands::auth::run_login(&app, email, password),
        Command::Logout => commands::auth::run_logout(&app),
        Command::Whoami { refresh, output } => commands::auth::run_whoami(&app, refresh, output),
        Command::Audit(command) => commands::audit::run(&app, command),
        Command::Finding(command) => commands::finding::run(&app, command),
        Command::Sync { output } => commands::sync::run_sync(&app, output),
        Command::Status { output } => commands::sync::run_status(&app, output),
        Command::Subscription(command) => commands::subscription::run(&app, command),
        Command::Settings(command) => commands::settings::run(&app, command),
        Command::Completion { .. } | Command::Watch => Ok(()),
    }
}
