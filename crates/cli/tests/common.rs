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

pub fn clubsync() -> Command {
    let mut cmd = cargo_bin_cmd!("clubsync");
    cmd.env("CLUBSYNC_LOG", "warn");
    cmd.env_remove("CLUBSYNC_STATE_DIR");
    cmd
}

/// Temp state dir whose backend refuses connections, so every command
/// runs offline.
pub fn offline_state() -> TempDir {
    let temp = TempDir::new().unwrap();
    std::fs::write(
        temp.path().join("clubsync.toml"),
        "remote_url = \"ws://127.0.0.1:1\"\nprobe_timeout_ms = 500\n",
    )
    .unwrap();
    temp
}

/// `clubsync --state-dir <temp> <args>`
pub fn run_in(temp: &TempDir, args: &[&str]) -> Command {
    let mut cmd = clubsync();
    cmd.arg("--state-dir").arg(temp.path()).args(args);
    cmd
}

/// Queue a change and return its id.
pub fn enqueue(temp: &TempDir, entity: &str, payload: &str) -> String {
    let output = run_in(temp, &["enqueue", entity, "update", payload])
        .output()
        .unwrap();
    assert!(output.status.success());
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Parse stdout of a successful command as JSON.
pub fn json_output(temp: &TempDir, args: &[&str]) -> serde_json::Value {
    let output = run_in(temp, args).output().unwrap();
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}
