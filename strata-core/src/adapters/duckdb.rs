//! DuckDB store - implementation of the database port
//!
//! The store is rooted at a data directory holding one `<name>.duckdb` file
//! per logical database. Databases are ATTACHed lazily to a single in-memory
//! connection; a database exists iff its file exists, so "missing database"
//! stays a real, observable state the ledger can recover from.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use duckdb::types::ValueRef;
use duckdb::{params_from_iter, Connection};
use serde_json::Value;

use crate::domain::result::{Error, Result};
use crate::ports::database::{Column, Database, Row};

/// File extension for database files under the data directory.
const DB_EXTENSION: &str = "duckdb";

impl From<duckdb::Error> for Error {
    fn from(err: duckdb::Error) -> Self {
        Error::Database(err.to_string())
    }
}

/// DuckDB implementation of the database port
pub struct DuckDbStore {
    conn: Mutex<Connection>,
    data_dir: PathBuf,
    attached: Mutex<HashSet<String>>,
}

impl DuckDbStore {
    /// Open a store rooted at `data_dir`, creating the directory if needed.
    ///
    /// No database files are touched here; each is attached on first
    /// reference.
    pub fn open(data_dir: &Path) -> Result<Self> {
        fs::create_dir_all(data_dir)?;
        // IMPORTANT: disable extension autoloading - cached extensions in
        // ~/.duckdb/extensions may have mismatched signatures on macOS
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        let conn = Connection::open_in_memory_with_flags(config)?;
        Ok(Self {
            conn: Mutex::new(conn),
            data_dir: data_dir.to_path_buf(),
            attached: Mutex::new(HashSet::new()),
        })
    }

    /// The directory holding the database files.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn db_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{}.{}", name, DB_EXTENSION))
    }

    /// Attach `name`, failing with `MissingDatabase` when its file is absent.
    fn ensure_attached(&self, name: &str) -> Result<()> {
        if self.attached.lock().unwrap().contains(name) {
            return Ok(());
        }
        let path = self.db_path(name);
        if !path.is_file() {
            return Err(Error::MissingDatabase(name.to_string()));
        }
        self.attach(name, &path)?;
        Ok(())
    }

    fn attach(&self, name: &str, path: &Path) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(&format!(
            "ATTACH {} AS {}",
            quote_literal(&path.display().to_string()),
            quote_ident(name)
        ))?;
        drop(conn);
        self.attached.lock().unwrap().insert(name.to_string());
        Ok(())
    }

    fn table_exists(&self, database: &str, table: &str) -> Result<bool> {
        self.ensure_attached(database)?;
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM duckdb_tables() WHERE database_name = ? AND table_name = ?",
            [database, table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn require_table(&self, database: &str, table: &str) -> Result<()> {
        if !self.table_exists(database, table)? {
            return Err(Error::MissingLedgerTable(table.to_string()));
        }
        Ok(())
    }
}

impl Database for DuckDbStore {
    fn list_databases(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.data_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(DB_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn create_database(&self, name: &str) -> Result<()> {
        let path = self.db_path(name);
        if path.is_file() {
            return Ok(());
        }
        // ATTACH creates the file when it does not exist
        self.attach(name, &path)
    }

    fn list_tables(&self, database: &str) -> Result<Vec<String>> {
        self.ensure_attached(database)?;
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT table_name FROM duckdb_tables() WHERE database_name = ?")?;
        let names = stmt.query_map([database], |row| row.get::<_, String>(0))?;

        let mut result = Vec::new();
        for name in names {
            result.push(name?);
        }
        result.sort();
        Ok(result)
    }

    fn create_table(&self, database: &str, table: &str, columns: &[Column]) -> Result<()> {
        self.ensure_attached(database)?;
        let column_sql: Vec<String> = columns
            .iter()
            .map(|c| format!("{} {}", quote_ident(c.name), c.sql_type))
            .collect();
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {}.{} ({})",
            quote_ident(database),
            quote_ident(table),
            column_sql.join(", ")
        ))?;
        Ok(())
    }

    fn insert(&self, database: &str, table: &str, row: &Row) -> Result<()> {
        self.require_table(database, table)?;
        let columns: Vec<String> = row.keys().map(|k| quote_ident(k)).collect();
        let placeholders: Vec<&str> = row.iter().map(|_| "?").collect();
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "INSERT INTO {}.{} ({}) VALUES ({})",
                quote_ident(database),
                quote_ident(table),
                columns.join(", "),
                placeholders.join(", ")
            ),
            params_from_iter(row.values().map(to_sql_value)),
        )?;
        Ok(())
    }

    fn delete_where(
        &self,
        database: &str,
        table: &str,
        column: &str,
        value: &Value,
    ) -> Result<usize> {
        self.require_table(database, table)?;
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute(
            &format!(
                "DELETE FROM {}.{} WHERE {} = ?",
                quote_ident(database),
                quote_ident(table),
                quote_ident(column)
            ),
            [to_sql_value(value)],
        )?;
        Ok(deleted)
    }

    fn scan(&self, database: &str, table: &str, order_by: &str) -> Result<Vec<Row>> {
        self.require_table(database, table)?;
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT * FROM {}.{} ORDER BY {}",
            quote_ident(database),
            quote_ident(table),
            quote_ident(order_by)
        ))?;

        let mut raw_rows = stmt.query([])?;
        let mut collected: Vec<Vec<Value>> = Vec::new();
        let mut column_count = 0;
        while let Some(row) = raw_rows.next()? {
            if collected.is_empty() {
                column_count = row.as_ref().column_count();
            }
            let values: Vec<Value> = (0..column_count).map(|i| column_to_json(row, i)).collect();
            collected.push(values);
        }
        drop(raw_rows);

        let names: Vec<String> = (0..stmt.column_count())
            .map(|i| {
                stmt.column_name(i)
                    .map(|s| s.to_string())
                    .unwrap_or_else(|_| format!("col{}", i))
            })
            .collect();

        Ok(collected
            .into_iter()
            .map(|values| names.iter().cloned().zip(values).collect())
            .collect())
    }

    fn execute_batch(&self, database: &str, sql: &str) -> Result<()> {
        self.ensure_attached(database)?;
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(&format!("USE {};\n{}", quote_ident(database), sql))?;
        Ok(())
    }
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn quote_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

fn to_sql_value(value: &Value) -> duckdb::types::Value {
    use duckdb::types::Value as Sql;
    match value {
        Value::Null => Sql::Null,
        Value::Bool(b) => Sql::Boolean(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Sql::BigInt(i)
            } else {
                Sql::Double(n.as_f64().unwrap_or(0.0))
            }
        }
        Value::String(s) => Sql::Text(s.clone()),
        other => Sql::Text(other.to_string()),
    }
}

fn column_to_json(row: &duckdb::Row, idx: usize) -> Value {
    match row.get_ref(idx) {
        Ok(ValueRef::Null) => Value::Null,
        Ok(ValueRef::Boolean(b)) => Value::Bool(b),
        Ok(ValueRef::TinyInt(i)) => serde_json::json!(i),
        Ok(ValueRef::SmallInt(i)) => serde_json::json!(i),
        Ok(ValueRef::Int(i)) => serde_json::json!(i),
        Ok(ValueRef::BigInt(i)) => serde_json::json!(i),
        Ok(ValueRef::UTinyInt(i)) => serde_json::json!(i),
        Ok(ValueRef::USmallInt(i)) => serde_json::json!(i),
        Ok(ValueRef::UInt(i)) => serde_json::json!(i),
        Ok(ValueRef::UBigInt(i)) => serde_json::json!(i),
        Ok(ValueRef::Float(f)) => serde_json::json!(f),
        Ok(ValueRef::Double(f)) => serde_json::json!(f),
        Ok(ValueRef::Text(bytes)) => Value::String(String::from_utf8_lossy(bytes).to_string()),
        _ => Value::Null,
    }
}
