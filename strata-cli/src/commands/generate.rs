//! Generate command - create a new migration stub

use anyhow::Result;

use super::{get_context, Target};
use crate::output;

pub fn run(target: &Target, name: &str) -> Result<()> {
    let (_ctx, strata) = get_context(target)?;
    let path = strata.generator.generate(name)?;
    output::success(&format!("Created {}", path.display()));
    Ok(())
}
