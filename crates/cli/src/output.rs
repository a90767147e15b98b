// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Text rendering for command output.

use chrono::{DateTime, Local, Utc};
use cs_core::{SyncQueueItem, SyncStatus, MAX_RETRIES};
use cs_engine::{ClearReport, DataSource, SyncOutcome};

pub fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{} {}", n, word)
    } else {
        format!("{} {}s", n, word)
    }
}

fn format_time(time: Option<DateTime<Utc>>) -> String {
    match time {
        Some(t) => t.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => "never".to_string(),
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

/// Settings-screen view of the status.
pub fn status(status: &SyncStatus) -> String {
    let mut lines = vec![
        format!("Status:       {}", status.state),
        format!(
            "Network:      {}",
            if status.is_online { "online" } else { "offline" }
        ),
        format!("Offline mode: {}", on_off(status.is_offline_mode)),
        format!("Pending:      {}", plural(status.pending_changes, "change")),
    ];
    if status.dead_items > 0 {
        lines.push(format!(
            "Dead:         {} (see 'clubsync queue --dead')",
            plural(status.dead_items, "change")
        ));
    }
    lines.push(format!("Last sync:    {}", format_time(status.last_sync_time)));
    lines.push(format!("Cache size:   {}", status.cache_size));
    lines.join("\n")
}

/// One-line status used by `clubsync watch`.
pub fn status_line(status: &SyncStatus) -> String {
    let network = if status.is_offline_mode {
        "offline-mode"
    } else if status.is_online {
        "online"
    } else {
        "offline"
    };
    format!(
        "[{}] {} {} pending={} dead={} cache={}",
        Local::now().format("%H:%M:%S"),
        network,
        status.state,
        status.pending_changes,
        status.dead_items,
        status.cache_size
    )
}

/// One queue row: id, entity, action, retry state.
pub fn queue_item(item: &SyncQueueItem) -> String {
    let state = if item.is_dead() {
        "dead".to_string()
    } else if item.retries > 0 {
        format!("retry {}/{}", item.retries, MAX_RETRIES)
    } else {
        "pending".to_string()
    };
    format!(
        "{}  {} {}  [{}]  {}",
        item.id,
        item.action,
        item.entity,
        state,
        item.created_at.format("%Y-%m-%d %H:%M:%S")
    )
}

pub fn sync_outcome(outcome: &SyncOutcome, status: &SyncStatus) -> String {
    match outcome {
        SyncOutcome::AlreadyRunning => "Sync already in progress".to_string(),
        SyncOutcome::Offline => format!(
            "Offline: {} waiting for the backend",
            plural(status.pending_changes, "change")
        ),
        SyncOutcome::OfflineMode => {
            "Offline mode is on, sync is disabled (run 'clubsync offline off')".to_string()
        }
        SyncOutcome::Completed(report) => {
            let mut msg = format!("Synced {}", plural(report.succeeded, "change"));
            if report.failed > 0 {
                msg.push_str(&format!(", {} failed", report.failed));
            }
            if report.dead > 0 {
                msg.push_str(&format!(", {} dead", report.dead));
            }
            if status.pending_changes > 0 {
                msg.push_str(&format!(" ({} still pending)", status.pending_changes));
            }
            msg
        }
    }
}

pub fn outcome_name(outcome: &SyncOutcome) -> &'static str {
    match outcome {
        SyncOutcome::AlreadyRunning => "already_running",
        SyncOutcome::Offline => "offline",
        SyncOutcome::OfflineMode => "offline_mode",
        SyncOutcome::Completed(_) => "completed",
    }
}

pub fn source(source: DataSource, stale: bool) -> &'static str {
    match (source, stale) {
        (DataSource::Network, _) => "network",
        (DataSource::Cache, false) => "cache",
        (DataSource::Cache, true) => "cache (stale)",
    }
}

pub fn cleared(report: &ClearReport) -> String {
    format!(
        "Cleared {} and {}",
        plural(report.queue_items, "queued change"),
        plural(report.cache_entries, "cached result")
    )
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
