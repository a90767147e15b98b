// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! csync - command line front end for the clubsync offline sync engine.
//!
//! Wires the engine to concrete platform pieces and exposes the settings
//! screen actions as commands:
//!
//! - SQLite storage in a per-user state directory
//! - a TCP reachability probe for connectivity
//! - a WebSocket client for the club backend
//!
//! # Example
//!
//! ```rust,ignore
//! use clap::Parser;
//! use csync::Cli;
//!
//! let cli = Cli::parse_from(["clubsync", "status", "-o", "json"]);
//! csync::run(cli)?;
//! ```

mod cli;
mod commands;
mod logging;
mod output;

pub mod config;
pub mod env;
pub mod error;
pub mod lockfile;
pub mod probe;
pub mod protocol;
pub mod remote;

#[cfg(test)]
mod test_server;

pub use cli::{Cli, Command, OfflineSwitch, OutputFormat};
pub use config::Config;
pub use error::{Error, Result};

/// Execute a parsed command line. This is the main entry point and runs
/// the command to completion on a fresh tokio runtime.
pub fn run(cli: Cli) -> Result<()> {
    logging::init(cli.verbose);
    let state_dir = config::resolve_state_dir(cli.state_dir.as_deref());

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(commands::dispatch(&state_dir, cli.command))
}
