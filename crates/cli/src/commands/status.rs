// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::Context;
use crate::cli::OutputFormat;
use crate::error::Result;
use crate::output;

pub async fn run(ctx: &Context, format: OutputFormat) -> Result<()> {
    let status = ctx.sync.refresh_status().await;
    match format {
        OutputFormat::Text => println!("{}", output::status(&status)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&status)?),
    }
    Ok(())
}
