// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Cache-first read.
//!
//! A fresh process knows nothing about connectivity yet, so the backend is
//! probed first. The cached value is printed before the network refresh
//! finishes. The process still waits for the refresh (bounded by the apply
//! timeout) so the cache is updated before exit.

use std::time::Duration;

use cs_engine::{QueryResponse, Refresh};
use serde_json::json;

use super::Context;
use crate::cli::OutputFormat;
use crate::error::Result;
use crate::output;

pub async fn run(ctx: &Context, key: &str, wait: bool, format: OutputFormat) -> Result<()> {
    ctx.sync.refresh_status().await;
    let mut response = ctx.sync.query(key).await?;
    let refresh = response.refresh.take();

    print_response(key, &response, format)?;

    if let Some(refresh) = refresh {
        let timeout = Duration::from_millis(ctx.config.apply_timeout_ms);
        finish_refresh(key, refresh, timeout, wait, format).await?;
    }
    Ok(())
}

fn print_response(key: &str, response: &QueryResponse, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let value = json!({
                "key": key,
                "data": response.data,
                "source": response.source,
                "timestamp": response.timestamp,
                "stale": response.stale,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => match &response.data {
            Some(data) => {
                println!("Source: {}", output::source(response.source, response.stale));
                println!("{}", serde_json::to_string_pretty(data)?);
            }
            None => println!("No cached data for '{}' (offline)", key),
        },
    }
    Ok(())
}

async fn finish_refresh(
    key: &str,
    refresh: Refresh,
    timeout: Duration,
    print: bool,
    format: OutputFormat,
) -> Result<()> {
    match tokio::time::timeout(timeout, refresh.wait()).await {
        Ok(Ok(data)) if print => match format {
            OutputFormat::Json => {
                let value = json!({ "key": key, "data": data, "source": "network" });
                println!("{}", serde_json::to_string_pretty(&value)?);
            }
            OutputFormat::Text => {
                println!("Refreshed from network:");
                println!("{}", serde_json::to_string_pretty(&data)?);
            }
        },
        Ok(Ok(_)) => {}
        Ok(Err(e)) => tracing::warn!(key, error = %e, "cache refresh failed"),
        Err(_) => tracing::warn!(key, "cache refresh timed out"),
    }
    Ok(())
}
