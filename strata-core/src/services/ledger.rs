//! Ledger service - the durable record of applied migrations
//!
//! One `sys_migrations` table per target database, one record per applied
//! migration. Insertion order is significant: it is the order migrations
//! were applied, which `list_applied` preserves via the `seq` column.
//!
//! No operation assumes the target database or the ledger table pre-exists.
//! Every write path re-checks existence rather than trusting a cached flag;
//! the check is cheap relative to writing into a nonexistent table.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::context::Context;
use crate::domain::result::{Error, Result};
use crate::ports::database::{Column, Database, Row};

/// Table holding one record per applied migration.
pub const LEDGER_TABLE: &str = "sys_migrations";

const LEDGER_COLUMNS: &[Column] = &[
    Column { name: "seq", sql_type: "BIGINT NOT NULL" },
    Column { name: "name", sql_type: "VARCHAR NOT NULL" },
];

/// Service managing the applied-migrations ledger
pub struct LedgerService {
    store: Arc<dyn Database>,
}

impl LedgerService {
    pub fn new(store: Arc<dyn Database>) -> Self {
        Self { store }
    }

    /// Make sure the target database and ledger table exist, creating either
    /// on demand. Idempotent: a fully provisioned target is a no-op.
    pub fn ensure_ready(&self, ctx: &Context) -> Result<()> {
        let database = ctx.database()?;
        if !self.store.list_databases()?.iter().any(|d| d == database) {
            self.store.create_database(database)?;
        }
        self.ensure_table(database)
    }

    fn ensure_table(&self, database: &str) -> Result<()> {
        if !self
            .store
            .list_tables(database)?
            .iter()
            .any(|t| t == LEDGER_TABLE)
        {
            self.store
                .create_table(database, LEDGER_TABLE, LEDGER_COLUMNS)?;
        }
        Ok(())
    }

    /// Applied migrations in the order they were applied. A database or
    /// ledger table that does not exist yet reads as empty history.
    pub fn list_applied(&self, ctx: &Context) -> Result<Vec<String>> {
        let database = ctx.database()?;
        let rows = match self.store.scan(database, LEDGER_TABLE, "seq") {
            Ok(rows) => rows,
            Err(Error::MissingDatabase(_)) | Err(Error::MissingLedgerTable(_)) => {
                return Ok(Vec::new())
            }
            Err(e) => return Err(e),
        };
        Ok(rows
            .iter()
            .filter_map(|row| row.get("name").and_then(Value::as_str))
            .map(str::to_string)
            .collect())
    }

    /// Record a successful `up`. Appends at the end of the insertion order;
    /// recording a name that is already present is a no-op.
    pub fn record_applied(&self, ctx: &Context, name: &str) -> Result<()> {
        let database = ctx.database()?;
        // the table may have gone missing since the last check
        self.ensure_ready(ctx)?;
        let rows = self.store.scan(database, LEDGER_TABLE, "seq")?;
        if rows
            .iter()
            .filter_map(|row| row.get("name").and_then(Value::as_str))
            .any(|n| n == name)
        {
            return Ok(());
        }
        let next_seq = rows
            .iter()
            .filter_map(|row| row.get("seq").and_then(Value::as_i64))
            .max()
            .unwrap_or(0)
            + 1;

        let mut record = Row::new();
        record.insert("seq".to_string(), json!(next_seq));
        record.insert("name".to_string(), json!(name));
        self.store.insert(database, LEDGER_TABLE, &record)
    }

    /// Remove the record of a reverted migration. A missing record, table,
    /// or database is a no-op.
    pub fn record_reverted(&self, ctx: &Context, name: &str) -> Result<()> {
        let database = ctx.database()?;
        match self
            .store
            .delete_where(database, LEDGER_TABLE, "name", &json!(name))
        {
            Ok(_) => Ok(()),
            Err(Error::MissingDatabase(_)) | Err(Error::MissingLedgerTable(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }
}
