// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod common;
use common::*;

#[test]
fn status_counts_pending_changes() {
    let temp = TempDir::new().unwrap();
    let id = create_audit(&temp, "Warehouse", "Dock 4");
    qa(&temp)
        .args(["audit", "edit", &id, "--notes", "Second visit"])
        .assert()
        .success();

    qa(&temp)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed in: no"))
        .stdout(predicate::str::contains("Pending changes: 2"))
        .stdout(predicate::str::contains("Last sync: never"));
}

#[test]
fn status_json() {
    let temp = TempDir::new().unwrap();
    create_audit(&temp, "Warehouse", "Dock 4");

    let output = qa(&temp).args(["status", "-o", "json"]).output().unwrap();
    let status: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(status["pending"], 1);
    assert_eq!(status["signed_in"], false);
    assert!(status["last_sync_at"].is_null());
}

#[test]
fn settings_set_and_show() {
    let temp = TempDir::new().unwrap();
    qa(&temp)
        .args(["settings", "set", "offline-mode", "on"])
        .assert()
        .success()
        .stdout("Set offline-mode = on\n");

    qa(&temp)
        .args(["settings", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("offline-mode: on"))
        .stdout(predicate::str::contains("auto-sync: on"));

    qa(&temp)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Offline mode: on"));
}

#[test]
fn settings_set_unknown_key_fails() {
    let temp = TempDir::new().unwrap();
    qa(&temp)
        .args(["settings", "set", "theme", "dark"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown setting"));
}

#[test]
fn commands_needing_a_session_fail_when_signed_out() {
    let temp = TempDir::new().unwrap();
    for args in [
        vec!["whoami"],
        vec!["sync"],
        vec!["watch"],
        vec!["subscription", "show"],
    ] {
        qa(&temp)
            .args(&args)
            .assert()
            .failure()
            .stderr(predicate::str::contains("not signed in"));
    }
}

#[test]
fn logout_when_signed_out_is_harmless() {
    let temp = TempDir::new().unwrap();
    qa(&temp)
        .arg("logout")
        .assert()
        .success()
        .stdout("Not signed in\n");
}

#[test]
fn bad_config_is_reported() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("config.toml"), "api_url = [").unwrap();
    qa(&temp)
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse"));
}

#[test]
fn completion_generates_script() {
    let temp = TempDir::new().unwrap();
    qa(&temp)
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("qa"));
}
