// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! User-facing app preferences persisted on the device.

use serde::{Deserialize, Serialize};

/// App settings record.
///
/// Every field has a default so that older or partial records still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Run a sync on a timer while online.
    pub auto_sync: bool,
    /// Minutes between timer-driven syncs.
    pub sync_interval_minutes: u32,
    pub notifications: bool,
    /// Suppresses automatic (non-user) sync triggers.
    pub offline_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            auto_sync: true,
            sync_interval_minutes: 5,
            notifications: true,
            offline_mode: false,
        }
    }
}

impl Settings {
    /// Sets a field by its kebab-case or camelCase name.
    pub fn set(&mut self, key: &str, value: &str) -> crate::Result<()> {
        let parse_bool = |v: &str| match v.to_lowercase().as_str() {
            "true" | "on" | "yes" | "1" => Ok(true),
            "false" | "off" | "no" | "0" => Ok(false),
            _ => Err(crate::Error::InvalidInput(format!(
                "invalid boolean for {key}: '{v}'"
            ))),
        };
        match key {
            "auto-sync" | "autoSync" => self.auto_sync = parse_bool(value)?,
            "sync-interval" | "syncIntervalMinutes" => {
                let minutes: u32 = value.parse().map_err(|_| {
                    crate::Error::InvalidInput(format!("invalid sync interval: '{value}'"))
                })?;
                if minutes == 0 {
                    return Err(crate::Error::InvalidInput(
                        "sync interval must be at least 1 minute".to_string(),
                    ));
                }
                self.sync_interval_minutes = minutes;
            }
            "notifications" => self.notifications = parse_bool(value)?,
            "offline-mode" | "offlineMode" => self.offline_mode = parse_bool(value)?,
            _ => {
                return Err(crate::Error::InvalidInput(format!(
                    "unknown setting: '{key}'\n  hint: valid settings are: auto-sync, sync-interval, notifications, offline-mode"
                )))
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
