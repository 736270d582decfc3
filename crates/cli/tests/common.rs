// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// Nothing listens on the discard port, so the server is always unreachable.
pub const OFFLINE_API: &str = "http://127.0.0.1:9/api";

/// `qa` against the data directory in `temp`, with no reachable server.
pub fn qa(temp: &TempDir) -> Command {
    qa_with_api(temp, OFFLINE_API)
}

/// `qa` against the data directory in `temp`, talking to `api_url`.
pub fn qa_with_api(temp: &TempDir, api_url: &str) -> Command {
    let mut cmd = cargo_bin_cmd!("qa");
    cmd.arg("--data-dir")
        .arg(temp.path())
        .env_remove("QA_DATA_DIR")
        .env_remove("QA_PASSWORD")
        .env_remove("QA_LOG")
        .env("QA_API_URL", api_url)
        .env("NO_COLOR", "1");
    cmd
}

/// Helper to create an audit and return its id
pub fn create_audit(temp: &TempDir, title: &str, location: &str) -> String {
    let output = qa(temp)
        .args(["audit", "new", title, location, "-o", "id"])
        .output()
        .unwrap();
    assert!(output.status.success(), "audit new failed: {output:?}");
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}
