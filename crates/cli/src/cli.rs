// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use cs_core::{Action, QueueId};

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Argument of `clubsync offline`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OfflineSwitch {
    On,
    Off,
    Toggle,
}

// Custom help template that groups commands into sections
const HELP_TEMPLATE: &str = "{about-with-newline}
{usage-heading} {usage}

{before-help}Options:
{options}{after-help}";

const COMMANDS_HELP: &str = "\
Status:
  status      Show sync status
  watch       Follow connectivity and sync in the foreground

Data:
  fetch       Read a query, cache first
  mutate      Apply a change now, or queue it when offline
  enqueue     Queue a change for the next sync

Sync Queue:
  queue       List queued changes
  sync        Sync queued changes now
  revive      Give a dead change a new retry budget
  discard     Drop a dead change

Settings:
  offline     Show or change offline mode
  clear       Delete all cached data and queued changes";

const QUICKSTART_HELP: &str = "\
Get started:
  clubsync status                        Show connectivity and pending changes
  clubsync mutate members update '{}'    Record a change
  clubsync sync                          Push queued changes";

#[derive(Parser, Debug)]
#[command(name = "clubsync")]
#[command(version)]
#[command(about = "Offline-first sync for club data")]
#[command(
    long_about = "Offline-first sync for club data.\n\n\
    Reads are served from a local cache and changes made while offline are \
    queued until the club backend is reachable again."
)]
#[command(help_template = HELP_TEMPLATE)]
#[command(before_help = COMMANDS_HELP)]
#[command(after_help = QUICKSTART_HELP)]
pub struct Cli {
    /// State directory holding the local database and clubsync.toml
    #[arg(long, global = true, value_name = "path")]
    pub state_dir: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show sync status
    Status {
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Show or change offline mode
    #[command(after_help = "Examples:\n  \
        clubsync offline           Show whether offline mode is on\n  \
        clubsync offline on        Serve from cache only and stop syncing\n  \
        clubsync offline toggle    Flip the current setting")]
    Offline {
        /// on, off or toggle; omit to show the current setting
        #[arg(value_enum)]
        switch: Option<OfflineSwitch>,
    },

    /// Apply a change now, or queue it when the backend cannot take it
    #[command(after_help = "Examples:\n  \
        clubsync mutate members create '{\"name\":\"Ann\"}'\n  \
        clubsync mutate events delete '{\"id\":12}'")]
    Mutate {
        /// Entity the change applies to (e.g. members, events)
        entity: String,

        /// create, update or delete
        action: Action,

        /// JSON payload
        #[arg(default_value = "{}")]
        payload: String,
    },

    /// Queue a change for the next sync without contacting the backend
    Enqueue {
        entity: String,

        /// create, update or delete
        action: Action,

        /// JSON payload
        #[arg(default_value = "{}")]
        payload: String,
    },

    /// List queued changes in sync order
    Queue {
        /// Only show changes that exhausted their retries
        #[arg(long)]
        dead: bool,

        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Drop a dead change from the queue
    #[command(arg_required_else_help = true)]
    Discard {
        /// Queue item ID
        id: QueueId,
    },

    /// Reset a change's retry budget so the next sync tries it again
    #[command(arg_required_else_help = true)]
    Revive {
        /// Queue item ID
        id: QueueId,
    },

    /// Sync queued changes now
    Sync {
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Read a query, serving the cached copy first
    Fetch {
        /// Query key
        key: String,

        /// Also wait for the background refresh of a cached value
        #[arg(long)]
        wait: bool,

        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Delete all cached data and queued changes
    Clear {
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Follow connectivity, sync on reconnect and print status changes
    Watch,
}
