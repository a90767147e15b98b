// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Destructive "clear offline data".

use std::io::{self, BufRead, Write};

use is_terminal::IsTerminal;

use super::Context;
use crate::error::{Error, Result};
use crate::output;

pub async fn run(ctx: &Context, yes: bool) -> Result<()> {
    if !yes {
        let status = ctx.sync.refresh_status().await;
        let prompt = format!(
            "Delete {} and {} of cached data? This cannot be undone. [y/N] ",
            output::plural(status.pending_changes + status.dead_items, "queued change"),
            status.cache_size
        );
        confirm(&prompt)?;
    }

    let report = ctx.sync.clear_offline_data().await?;
    println!("{}", output::cleared(&report));
    Ok(())
}

/// Ask on the terminal. Without a terminal there is nobody to ask.
fn confirm(prompt: &str) -> Result<()> {
    let stdin = io::stdin();
    if !stdin.is_terminal() {
        return Err(Error::ConfirmationRequired);
    }

    let mut stdout = io::stdout();
    write!(stdout, "{}", prompt)?;
    stdout.flush()?;

    let mut answer = String::new();
    stdin.lock().read_line(&mut answer)?;
    if is_yes(&answer) {
        Ok(())
    } else {
        Err(Error::Aborted)
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
