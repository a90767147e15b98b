// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.

use std::path::PathBuf;

/// Environment variable names read by the CLI.
pub mod vars {
    pub const CLUBSYNC_STATE_DIR: &str = "CLUBSYNC_STATE_DIR";
    pub const CLUBSYNC_LOG: &str = "CLUBSYNC_LOG";
    pub const RUST_LOG: &str = "RUST_LOG";
    pub const XDG_STATE_HOME: &str = "XDG_STATE_HOME";
}

/// Returns the value of `CLUBSYNC_STATE_DIR` if set.
pub fn state_dir() -> Option<PathBuf> {
    non_empty(vars::CLUBSYNC_STATE_DIR).map(PathBuf::from)
}

/// Returns the value of `XDG_STATE_HOME` if set.
pub fn xdg_state_home() -> Option<PathBuf> {
    non_empty(vars::XDG_STATE_HOME).map(PathBuf::from)
}

/// Log filter directive: `CLUBSYNC_LOG`, then `RUST_LOG`.
pub fn log_filter() -> Option<String> {
    non_empty(vars::CLUBSYNC_LOG).or_else(|| non_empty(vars::RUST_LOG))
}

fn non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
