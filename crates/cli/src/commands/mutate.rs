// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use cs_core::Action;
use cs_engine::MutationOutcome;

use super::{parse_payload, Context};
use crate::error::Result;

pub async fn run(ctx: &Context, entity: &str, action: Action, payload: &str) -> Result<()> {
    let payload = parse_payload(payload)?;
    match ctx.sync.mutate(entity, action, payload).await? {
        MutationOutcome::Applied => println!("Applied {} {}", action, entity),
        MutationOutcome::Queued(id) => {
            println!("Queued {} {} as {} (will sync when online)", action, entity, id)
        }
    }
    Ok(())
}
