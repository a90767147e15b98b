// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::Context;
use crate::cli::OfflineSwitch;
use crate::error::Result;

pub async fn run(ctx: &Context, switch: Option<OfflineSwitch>) -> Result<()> {
    let enabled = match switch {
        None => ctx.sync.refresh_status().await.is_offline_mode,
        Some(OfflineSwitch::Toggle) => ctx.sync.toggle_offline_mode().await?,
        Some(OfflineSwitch::On) => {
            ctx.sync.set_offline_mode(true).await?;
            true
        }
        Some(OfflineSwitch::Off) => {
            ctx.sync.set_offline_mode(false).await?;
            false
        }
    };

    if enabled {
        println!("Offline mode: on (reads come from cache, sync is paused)");
    } else {
        println!("Offline mode: off");
    }
    Ok(())
}
