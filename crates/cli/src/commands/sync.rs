// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use cs_engine::SyncOutcome;
use serde_json::json;

use super::Context;
use crate::cli::OutputFormat;
use crate::error::Result;
use crate::output;

/// Manual "sync now".
pub async fn run(ctx: &Context, format: OutputFormat) -> Result<()> {
    let outcome = ctx.sync.process_sync_queue().await;
    let status = ctx.sync.refresh_status().await;

    match format {
        OutputFormat::Text => println!("{}", output::sync_outcome(&outcome, &status)),
        OutputFormat::Json => {
            let report = match outcome {
                SyncOutcome::Completed(report) => Some(report),
                _ => None,
            };
            let value = json!({
                "outcome": output::outcome_name(&outcome),
                "report": report,
                "status": status,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }
    Ok(())
}
