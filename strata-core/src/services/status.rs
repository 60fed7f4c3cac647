//! Status service - applied and pending migration summary

use std::sync::Arc;

use serde::Serialize;

use crate::context::Context;
use crate::domain::result::Result;
use crate::migrations::MigrationDirectory;
use crate::ports::database::Database;
use crate::services::ledger::LedgerService;
use crate::services::scheduler::SchedulerService;

/// Service reporting migration state for the configured target
pub struct StatusService {
    ledger: LedgerService,
    scheduler: SchedulerService,
}

impl StatusService {
    pub fn new(store: Arc<dyn Database>, directory: MigrationDirectory) -> Self {
        Self {
            ledger: LedgerService::new(Arc::clone(&store)),
            scheduler: SchedulerService::new(store, directory),
        }
    }

    /// Current summary. Applied comes straight from the ledger in insertion
    /// order (including records whose definition file has since been
    /// deleted); pending comes from the scheduler in ascending order.
    pub fn status(&self, ctx: &Context) -> Result<StatusSummary> {
        let pending = self.scheduler.pending(ctx)?;
        let applied = self.ledger.list_applied(ctx)?;

        Ok(StatusSummary {
            total_applied: applied.len(),
            total_pending: pending.len(),
            applied,
            pending,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct StatusSummary {
    pub total_applied: usize,
    pub total_pending: usize,
    pub applied: Vec<String>,
    pub pending: Vec<String>,
}
