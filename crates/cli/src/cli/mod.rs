// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

mod args;

use std::path::PathBuf;

use crate::colors;
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use qa_core::{AuditStatus, BillingCycle, FindingStatus, Plan, Severity};

pub use args::{AuditFieldArgs, AuditFilterArgs};

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "qa")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Offline-first site audits with background sync")]
#[command(
    long_about = "Offline-first site audits with background sync.\n\n\
    Audits and findings are recorded locally and queued. The queue is pushed to the\n\
    QuickAudit API whenever you sync, or automatically while `qa watch` runs."
)]
#[command(after_help = colors::examples("\
Quickstart:
  qa login ann@example.com            Sign in
  qa audit new \"Warehouse\" \"Dock 4\"   Record an audit, even offline
  qa finding add <id> \"Blocked exit\"  Attach a finding
  qa sync                             Push queued changes and pull"))]
pub struct Cli {
    /// Directory holding the local store and config.toml
    #[arg(short = 'D', long = "data-dir", global = true, value_name = "path")]
    pub data_dir: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    // ─────────────────────────────────────────────────────────────────────────
    // Account
    // ─────────────────────────────────────────────────────────────────────────
    /// Create an account and sign in
    #[command(after_help = colors::examples("\
Examples:
  qa register \"Ann Lee\" ann@example.com --company Acme
  QA_PASSWORD=secret qa register \"Ann Lee\" ann@example.com"))]
    Register {
        /// Full name
        #[arg(value_parser = non_empty_string)]
        name: String,

        /// Email address
        #[arg(value_parser = non_empty_string)]
        email: String,

        /// Company name
        #[arg(long)]
        company: Option<String>,

        /// Password (prompted on stdin when omitted)
        #[arg(long, env = "QA_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Sign in and keep the session on this device
    Login {
        /// Email address
        #[arg(value_parser = non_empty_string)]
        email: String,

        /// Password (prompted on stdin when omitted)
        #[arg(long, env = "QA_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Sign out and forget the session
    Logout,

    /// Show the signed-in user
    Whoami {
        /// Fetch the profile from the server first
        #[arg(long)]
        refresh: bool,

        /// Output format
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Audits
    // ─────────────────────────────────────────────────────────────────────────
    /// Create, list and edit audits
    #[command(subcommand)]
    Audit(AuditCommand),

    /// Record and resolve findings on an audit
    #[command(subcommand)]
    Finding(FindingCommand),

    // ─────────────────────────────────────────────────────────────────────────
    // Sync
    // ─────────────────────────────────────────────────────────────────────────
    /// Push queued changes, then pull the server's audits
    #[command(after_help = colors::examples("\
Examples:
  qa sync              Run one sync cycle
  qa sync -o json      Print the cycle report as JSON"))]
    Sync {
        /// Output format
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Show pending changes and the last sync
    Status {
        /// Output format
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Stay running: sync on start, on reconnect and on the settings timer
    Watch,

    // ─────────────────────────────────────────────────────────────────────────
    // Account extras
    // ─────────────────────────────────────────────────────────────────────────
    /// Manage the company subscription
    #[command(subcommand)]
    Subscription(SubscriptionCommand),

    /// Show or change app settings
    #[command(subcommand)]
    Settings(SettingsCommand),

    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum AuditCommand {
    /// Create an audit (works offline)
    #[command(after_help = colors::examples("\
Examples:
  qa audit new \"Warehouse\" \"Dock 4\"             Create a draft audit
  qa audit new \"Kitchen\" \"Store 12\" -t food,q3  Create with tags
  qa audit new \"Lab\" \"Bldg 2\" -a ann -o id      Print only the new id"))]
    New {
        /// Title
        #[arg(value_parser = non_empty_string)]
        title: String,

        /// Site or location
        #[arg(value_parser = non_empty_string)]
        location: String,

        #[command(flatten)]
        fields: AuditFieldArgs,

        /// Print only the new audit's id
        #[arg(long = "output", short = 'o', value_parser = ["id"])]
        output: Option<String>,
    },

    /// List local audits
    #[command(after_help = colors::examples("\
Examples:
  qa audit list                      All local audits
  qa audit list -s in_progress       Only audits being walked
  qa audit list -q dock -t q3        Search with a tag filter"))]
    List {
        #[command(flatten)]
        filter: AuditFilterArgs,

        /// Output format
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Show one audit with its findings
    Show {
        /// Audit id or unique id prefix
        id: String,

        /// Output format
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Change fields on an audit
    #[command(after_help = colors::examples("\
Examples:
  qa audit edit <id> --status in_progress
  qa audit edit <id> --title \"Dock 4 (night)\" --notes \"Second visit\""))]
    Edit {
        /// Audit id or unique id prefix
        id: String,

        /// New title
        #[arg(long, value_parser = non_empty_string)]
        title: Option<String>,

        /// New location
        #[arg(long, short, value_parser = non_empty_string)]
        location: Option<String>,

        /// New status
        #[arg(long, short)]
        status: Option<AuditStatus>,

        #[command(flatten)]
        fields: AuditFieldArgs,
    },

    /// Delete an audit
    Rm {
        /// Audit id or unique id prefix
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum FindingCommand {
    /// Add a finding to an audit
    #[command(after_help = colors::examples("\
Examples:
  qa finding add <id> \"Blocked fire exit\" --severity critical
  qa finding add <id> \"Loose rail\" -d \"East stairwell\" -a bob
  qa finding add <id> \"Cracked tile\" --photo IMG_0142.jpg --photo IMG_0143.jpg"))]
    Add {
        /// Audit id or unique id prefix
        audit: String,

        /// Finding title
        #[arg(value_parser = non_empty_string)]
        title: String,

        /// Severity (low, medium, high, critical)
        #[arg(long, short, default_value = "medium")]
        severity: Severity,

        /// Longer description
        #[arg(long, short)]
        description: Option<String>,

        /// Where on site
        #[arg(long, short)]
        location: Option<String>,

        /// Who should fix it
        #[arg(long, short)]
        assignee: Option<String>,

        /// Due date
        #[arg(long)]
        due: Option<String>,

        /// Notes
        #[arg(long, value_parser = non_empty_string)]
        notes: Option<String>,

        /// Attach a photo reference (repeatable)
        #[arg(long = "photo", value_parser = non_empty_string)]
        photos: Vec<String>,
    },

    /// Change a finding
    #[command(after_help = colors::examples("\
Examples:
  qa finding edit <audit> <finding> --status in_progress
  qa finding edit <audit> <finding> --severity high --notes \"Parts ordered\"
  qa finding edit <audit> <finding> --photo IMG_0150.jpg --remove-photo IMG_0142.jpg"))]
    Edit {
        /// Audit id or unique id prefix
        audit: String,

        /// Finding id or unique id prefix
        finding: String,

        /// New title
        #[arg(long, value_parser = non_empty_string)]
        title: Option<String>,

        /// New severity
        #[arg(long, short)]
        severity: Option<Severity>,

        /// New status (open, in_progress, resolved)
        #[arg(long)]
        status: Option<FindingStatus>,

        /// New description
        #[arg(long, short)]
        description: Option<String>,

        /// New notes
        #[arg(long, value_parser = non_empty_string)]
        notes: Option<String>,

        /// Attach a photo reference (repeatable)
        #[arg(long = "photo", value_parser = non_empty_string)]
        photos: Vec<String>,

        /// Detach a photo reference (repeatable)
        #[arg(long = "remove-photo", value_parser = non_empty_string)]
        remove_photos: Vec<String>,
    },

    /// Remove a finding from an audit
    Rm {
        /// Audit id or unique id prefix
        audit: String,

        /// Finding id or unique id prefix
        finding: String,
    },

    /// Mark a finding resolved
    Resolve {
        /// Audit id or unique id prefix
        audit: String,

        /// Finding id
        finding: String,

        /// Resolution notes
        #[arg(long)]
        notes: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum SubscriptionCommand {
    /// Show the current subscription
    Show {
        /// Output format
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Start or change a subscription
    #[command(after_help = colors::examples("\
Examples:
  qa subscription subscribe pro
  qa subscription subscribe enterprise --cycle annual --api-access"))]
    Subscribe {
        /// Plan (basic, pro, enterprise)
        plan: Plan,

        /// Billing cycle (monthly, annual)
        #[arg(long, default_value = "monthly")]
        cycle: BillingCycle,

        /// Enable custom templates
        #[arg(long)]
        custom_templates: bool,

        /// Enable priority support
        #[arg(long)]
        priority_support: bool,

        /// Enable API access
        #[arg(long)]
        api_access: bool,
    },

    /// Cancel the subscription
    Cancel,
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Show current settings
    Show {
        /// Output format
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Change one setting
    #[command(after_help = colors::examples("\
Examples:
  qa settings set offline-mode on
  qa settings set sync-interval 15"))]
    Set {
        /// auto-sync, sync-interval, notifications or offline-mode
        key: String,

        /// New value
        value: String,
    },
}

#[cfg(test)]
#[path = "../cli_tests.rs"]
mod tests;
