//! CLI command implementations

pub mod down;
pub mod generate;
pub mod status;
pub mod up;

use std::path::PathBuf;

use anyhow::Result;
use strata_core::config::{self, Config};
use strata_core::{Context, StrataContext};

/// Raw target options from the command line.
pub struct Target {
    pub database: Option<String>,
    pub port: Option<u16>,
    pub dir: PathBuf,
}

/// Build the invocation context and service wiring for one command.
///
/// The database target resolves command-line flags first, then the
/// `strata.json` file next to the migrations. A missing config file is fine
/// here - commands that need a database fail with their own precondition.
pub fn get_context(target: &Target) -> Result<(Context, StrataContext)> {
    let config = Config::try_load(&target.dir)?;

    let database = target
        .database
        .clone()
        .or_else(|| config.as_ref().map(|c| c.db.clone()));
    let port = target.port.or_else(|| config.as_ref().and_then(|c| c.port));

    let mut ctx = Context::new();
    ctx.set(database, port);

    let data_dir = config::resolve_data_dir(config.as_ref());
    let strata = StrataContext::new(&target.dir, &data_dir)?;
    Ok((ctx, strata))
}
