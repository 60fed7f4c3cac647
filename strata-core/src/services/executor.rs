//! Executor service - applies and reverses migrations
//!
//! Each operation runs one migration procedure to completion and then makes
//! the matching ledger write. A failed procedure leaves the ledger exactly
//! as it was: an `up` failure keeps the migration pending for a retry, a
//! `down` failure keeps it applied. There is no persisted in-progress
//! state; definitions are expected to be written idempotently to tolerate
//! a crash between a successful `up` and its ledger write.

use std::sync::Arc;

use crate::context::Context;
use crate::domain::migration::{validate_name, LAST_ALIAS};
use crate::domain::result::{Error, Result};
use crate::migrations::{MigrationDirectory, MigrationRegistry};
use crate::ports::database::Database;
use crate::services::ledger::LedgerService;
use crate::services::scheduler::SchedulerService;

/// Service applying and reversing migrations
pub struct ExecutorService {
    store: Arc<dyn Database>,
    directory: MigrationDirectory,
    ledger: LedgerService,
    scheduler: SchedulerService,
}

impl ExecutorService {
    pub fn new(store: Arc<dyn Database>, directory: MigrationDirectory) -> Self {
        Self {
            ledger: LedgerService::new(Arc::clone(&store)),
            scheduler: SchedulerService::new(Arc::clone(&store), directory.clone()),
            directory,
            store,
        }
    }

    /// Apply one migration and record it. The migration's own failure
    /// propagates unmodified and the ledger is not touched in that case.
    pub fn apply_up(&self, ctx: &Context, name: &str) -> Result<String> {
        ctx.database()?;
        self.directory.ensure_exists()?;
        let registry = MigrationRegistry::from_directory(&self.directory)?;
        self.apply_one(ctx, &registry, name)
    }

    fn apply_one(&self, ctx: &Context, registry: &MigrationRegistry, name: &str) -> Result<String> {
        let database = ctx.database()?.to_string();
        let migration = registry
            .get(name)
            .ok_or_else(|| Error::InvalidMigrationReference(name.to_string()))?;

        self.ledger.ensure_ready(ctx)?;
        migration.up(self.store.as_ref(), &database)?;
        self.ledger.record_applied(ctx, name)?;
        ctx.write_line(&format!("applied {}", name));
        Ok(name.to_string())
    }

    /// Apply every pending migration, strictly one at a time in ascending
    /// identifier order, halting at the first failure. Migrations applied
    /// before a failure stay recorded and were already reported through the
    /// context sink; the failing one and everything after are not attempted
    /// or recorded.
    pub fn run_pending(&self, ctx: &Context) -> Result<Vec<String>> {
        ctx.database()?;
        self.directory.ensure_exists()?;
        let registry = MigrationRegistry::from_directory(&self.directory)?;

        let pending = self.scheduler.pending(ctx)?;
        let mut applied = Vec::with_capacity(pending.len());
        for name in &pending {
            self.apply_one(ctx, &registry, name)?;
            applied.push(name.clone());
        }
        Ok(applied)
    }

    /// Reverse one applied migration and delete its ledger record.
    ///
    /// `last` resolves to the most recent applied entry and fails
    /// `NoMigrationsApplied` on an empty ledger. Any other name must be a
    /// well-formed identifier present in the applied ledger.
    pub fn apply_down(&self, ctx: &Context, name: &str) -> Result<String> {
        let database = ctx.database()?.to_string();
        validate_name(name)?;
        self.directory.ensure_exists()?;
        let registry = MigrationRegistry::from_directory(&self.directory)?;

        self.ledger.ensure_ready(ctx)?;
        let applied = self.ledger.list_applied(ctx)?;
        let resolved = if name == LAST_ALIAS {
            applied
                .iter()
                .max()
                .cloned()
                .ok_or(Error::NoMigrationsApplied)?
        } else {
            if !applied.iter().any(|n| n == name) {
                return Err(Error::InvalidMigrationReference(name.to_string()));
            }
            name.to_string()
        };

        // a ledger record whose definition file was deleted cannot be
        // reversed; nothing is registered for it
        let migration = registry
            .get(&resolved)
            .ok_or_else(|| Error::InvalidMigrationReference(resolved.clone()))?;

        migration.down(self.store.as_ref(), &database)?;
        self.ledger.record_reverted(ctx, &resolved)?;
        ctx.write_line(&format!("reverted {}", resolved));
        Ok(resolved)
    }
}
