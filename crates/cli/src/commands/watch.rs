// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Foreground mode: poll reachability, sync on reconnect, print every
//! status change until interrupted.

use tokio_util::sync::CancellationToken;

use super::Context;
use crate::error::Result;
use crate::output;

pub async fn run(ctx: &Context) -> Result<()> {
    let status = ctx.sync.start().await;
    println!("{}", output::status_line(&status));

    let cancel = CancellationToken::new();
    let poller = ctx
        .sync
        .monitor()
        .spawn_poller(ctx.config.watch_interval(), cancel.clone());
    let mut rx = ctx.sync.subscribe_status();
    rx.mark_unchanged();

    // Starting up counts as coming to the foreground
    if status.is_online && status.pending_changes > 0 {
        ctx.sync.process_sync_queue().await;
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let status = rx.borrow_and_update().clone();
                println!("{}", output::status_line(&status));
            }
        }
    }

    cancel.cancel();
    let _ = poller.await;
    ctx.sync.shutdown().await;
    tracing::info!(state_dir = %ctx.state_dir.display(), "watch stopped");
    Ok(())
}
