// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use tracing_subscriber::EnvFilter;

use crate::env;

/// Install the global tracing subscriber. Logs go to stderr so stdout
/// stays parseable.
pub fn init(verbose: bool) {
    let filter = match env::log_filter() {
        Some(directives) => EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new("info")),
        None if verbose => EnvFilter::new("debug"),
        None => EnvFilter::new("info"),
    };

    // A second init (tests running commands in-process) is ignored
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
