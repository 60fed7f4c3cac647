//! Scheduler service - computes the ordered pending set

use std::collections::HashSet;
use std::sync::Arc;

use crate::context::Context;
use crate::domain::result::Result;
use crate::migrations::MigrationDirectory;
use crate::ports::database::Database;
use crate::services::ledger::LedgerService;

/// Service computing which migrations still need to run
pub struct SchedulerService {
    directory: MigrationDirectory,
    ledger: LedgerService,
}

impl SchedulerService {
    pub fn new(store: Arc<dyn Database>, directory: MigrationDirectory) -> Self {
        Self {
            directory,
            ledger: LedgerService::new(store),
        }
    }

    /// Definitions not yet recorded in the ledger, in ascending identifier
    /// order. Deterministic for a fixed filesystem and ledger state; never
    /// cached.
    ///
    /// Ledger records whose definition file has been deleted are ignored
    /// here - the pending set only ever contains existing definitions.
    pub fn pending(&self, ctx: &Context) -> Result<Vec<String>> {
        ctx.database()?;
        self.directory.ensure_exists()?;
        self.ledger.ensure_ready(ctx)?;

        let applied: HashSet<String> = self.ledger.list_applied(ctx)?.into_iter().collect();
        let definitions = self.directory.list()?;
        Ok(definitions
            .into_iter()
            .filter(|name| !applied.contains(name))
            .collect())
    }
}
