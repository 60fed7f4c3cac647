//! Strata Core - migration scheduling and ledger consistency
//!
//! This crate implements the migration engine following hexagonal
//! architecture:
//!
//! - **domain**: naming rules and the closed error type
//! - **ports**: trait definition for the backing store (Database)
//! - **migrations**: definitions, SQL scripts, registry, directory
//! - **services**: ledger, scheduler, executor, status, generator
//! - **adapters**: the DuckDB implementation of the port

pub mod adapters;
pub mod config;
pub mod context;
pub mod domain;
pub mod migrations;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use adapters::duckdb::DuckDbStore;
use migrations::MigrationDirectory;
use ports::database::Database;
use services::{ExecutorService, GeneratorService, SchedulerService, StatusService};

// Re-export commonly used types at crate root
pub use context::Context;
pub use domain::result::{Error, Result};
pub use services::StatusSummary;

/// Main entry point for strata operations
///
/// Holds the store and all services for one migrations directory and data
/// directory. The invocation [`Context`] stays separate so one process can
/// run many isolated invocations against the same wiring.
pub struct StrataContext {
    pub store: Arc<dyn Database>,
    pub scheduler: SchedulerService,
    pub executor: ExecutorService,
    pub status: StatusService,
    pub generator: GeneratorService,
}

impl StrataContext {
    /// Create the wiring. Nothing is validated here; each command checks its
    /// own preconditions in the order the contract requires.
    pub fn new(migrations_dir: &Path, data_dir: &Path) -> Result<Self> {
        let store: Arc<dyn Database> = Arc::new(DuckDbStore::open(data_dir)?);
        let directory = MigrationDirectory::new(migrations_dir);

        Ok(Self {
            scheduler: SchedulerService::new(Arc::clone(&store), directory.clone()),
            executor: ExecutorService::new(Arc::clone(&store), directory.clone()),
            status: StatusService::new(Arc::clone(&store), directory.clone()),
            generator: GeneratorService::new(directory),
            store,
        })
    }
}
