//! Status command - report applied and pending migrations

use anyhow::Result;
use colored::Colorize;

use super::{get_context, Target};
use crate::output;

pub fn run(target: &Target, json: bool) -> Result<()> {
    let (ctx, strata) = get_context(target)?;
    let summary = strata.status.status(&ctx)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{}", "Migration Status".bold());
    println!();

    let mut table = output::create_table();
    table.add_row(vec!["Applied", &summary.total_applied.to_string()]);
    table.add_row(vec!["Pending", &summary.total_pending.to_string()]);
    println!("{}", table);

    if !summary.applied.is_empty() {
        println!();
        println!("{}", "Applied".bold());
        for name in &summary.applied {
            println!("  {}", name.green());
        }
    }

    if !summary.pending.is_empty() {
        println!();
        println!("{}", "Pending".bold());
        for name in &summary.pending {
            println!("  {}", name.yellow());
        }
    }

    Ok(())
}
