//! Up command - apply all pending migrations

use anyhow::Result;

use super::{get_context, Target};
use crate::output;

pub fn run(target: &Target, json: bool) -> Result<()> {
    let (mut ctx, strata) = get_context(target)?;
    if json {
        // progress lines would corrupt the JSON document
        ctx.set_output(Box::new(std::io::sink()));
    }

    let applied = strata.executor.run_pending(&ctx)?;

    if json {
        println!("{}", serde_json::json!({ "applied": applied }));
        return Ok(());
    }

    if applied.is_empty() {
        output::info("Nothing to apply");
    } else {
        output::success(&format!("{} migration(s) applied", applied.len()));
    }
    Ok(())
}
