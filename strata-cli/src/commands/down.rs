//! Down command - reverse one applied migration

use anyhow::Result;

use super::{get_context, Target};
use crate::output;

pub fn run(target: &Target, name: &str, json: bool) -> Result<()> {
    let (mut ctx, strata) = get_context(target)?;
    if json {
        ctx.set_output(Box::new(std::io::sink()));
    }

    let reverted = strata.executor.apply_down(&ctx, name)?;

    if json {
        println!("{}", serde_json::json!({ "reverted": reverted }));
        return Ok(());
    }

    output::success(&format!("1 migration reverted ({})", reverted));
    Ok(())
}
