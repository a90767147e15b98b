// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync queue inspection and dead-item handling.

use cs_core::{Action, QueueId};

use super::{parse_payload, Context};
use crate::cli::OutputFormat;
use crate::error::Result;
use crate::output;

pub async fn enqueue(ctx: &Context, entity: &str, action: Action, payload: &str) -> Result<()> {
    let payload = parse_payload(payload)?;
    let id = ctx.sync.enqueue(entity, action, payload).await?;
    println!("{}", id);
    Ok(())
}

pub async fn list(ctx: &Context, dead_only: bool, format: OutputFormat) -> Result<()> {
    let items: Vec<_> = ctx
        .sync
        .queued_items()
        .await
        .into_iter()
        .filter(|item| !dead_only || item.is_dead())
        .collect();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&items)?),
        OutputFormat::Text if items.is_empty() => {
            if dead_only {
                println!("No dead changes");
            } else {
                println!("Queue is empty");
            }
        }
        OutputFormat::Text => {
            for item in &items {
                println!("{}", output::queue_item(item));
            }
        }
    }
    Ok(())
}

pub async fn discard(ctx: &Context, id: QueueId) -> Result<()> {
    ctx.sync.discard(id).await?;
    println!("Discarded {}", id);
    Ok(())
}

pub async fn revive(ctx: &Context, id: QueueId) -> Result<()> {
    ctx.sync.revive(id).await?;
    println!("Revived {} (will be retried on the next sync)", id);
    Ok(())
}
