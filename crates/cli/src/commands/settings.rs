// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use qa_core::Settings;
use qa_sync::App;

use crate::cli::{OutputFormat, SettingsCommand};
use crate::display::format_settings;
use crate::error::Result;

use super::print_json;

pub fn run(app: &App, command: SettingsCommand) -> Result<()> {
    match command {
        SettingsCommand::Show { output } => {
            let settings = app.data.settings()?;
            match output {
                OutputFormat::Json => print_json(&settings),
                OutputFormat::Text => {
                    println!("{}", format_settings(&settings));
                    Ok(())
                }
            }
        }
        SettingsCommand::Set { key, value } => {
            set(app, &key, &value)?;
            println!("Set {key} = {value}");
            Ok(())
        }
    }
}

pub(crate) fn set(app: &App, key: &str, value: &str) -> Result<Settings> {
    let mut settings = app.data.settings()?;
    settings.set(key, value)?;
    app.data.save_settings(&settings)?;
    Ok(settings)
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
