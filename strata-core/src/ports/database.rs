//! Database port - storage abstraction
//!
//! The engine needs only these primitives from its backing store. Any store
//! offering them (relational, document, key-value) can implement this trait;
//! the bundled adapter is DuckDB.

use serde_json::Value;

use crate::domain::result::Result;

/// A single stored record, column name to value.
pub type Row = serde_json::Map<String, Value>;

/// Column definition used when creating tables through the port.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub sql_type: &'static str,
}

/// Storage abstraction the migration engine runs against
///
/// Operations that reference a database that does not exist fail with
/// `Error::MissingDatabase`; scans and writes against a table that does not
/// exist fail with `Error::MissingLedgerTable`. Both are recoverable signals
/// for the caller, not user-facing failures.
pub trait Database: Send + Sync {
    /// Names of all existing databases.
    fn list_databases(&self) -> Result<Vec<String>>;

    /// Create an empty database. Creating one that already exists is a no-op.
    fn create_database(&self, name: &str) -> Result<()>;

    /// Names of all tables in `database`.
    fn list_tables(&self, database: &str) -> Result<Vec<String>>;

    /// Create a table. Creating one that already exists is a no-op.
    fn create_table(&self, database: &str, table: &str, columns: &[Column]) -> Result<()>;

    /// Insert one record.
    fn insert(&self, database: &str, table: &str, row: &Row) -> Result<()>;

    /// Delete records where `column` equals `value`; returns how many.
    fn delete_where(
        &self,
        database: &str,
        table: &str,
        column: &str,
        value: &Value,
    ) -> Result<usize>;

    /// Read the whole table, ordered ascending by `order_by`.
    fn scan(&self, database: &str, table: &str, order_by: &str) -> Result<Vec<Row>>;

    /// Run a batch of SQL statements with `database` as the default catalog.
    /// This is the capability handed to migration definitions.
    fn execute_batch(&self, database: &str, sql: &str) -> Result<()>;
}
