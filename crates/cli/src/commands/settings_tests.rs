// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::super::testing;
use super::*;

#[test]
fn set_persists() {
    let app = testing::app();
    set(&app, "offline-mode", "on").unwrap();
    set(&app, "sync-interval", "15").unwrap();

    let stored = app.data.settings().unwrap();
    assert!(stored.offline_mode);
    assert_eq!(stored.sync_interval_minutes, 15);
    assert!(stored.auto_sync);
}

#[test]
fn bad_value_leaves_settings_untouched() {
    let app = testing::app();
    assert!(set(&app, "sync-interval", "0").is_err());
    assert!(set(&app, "colour", "blue").is_err());
    assert_eq!(app.data.settings().unwrap(), Settings::default());
}
