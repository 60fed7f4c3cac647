//! SQL migration scripts
//!
//! A script file holds both procedures of one migration:
//!
//! ```sql
//! -- migrate:up
//! CREATE TABLE persons (id INTEGER, name VARCHAR);
//!
//! -- migrate:down
//! DROP TABLE persons;
//! ```
//!
//! Both markers are required. The down section may be left empty for an
//! irreversible migration, which then refuses to run at `down` time.

use std::fs;
use std::path::PathBuf;

use sqlparser::dialect::DuckDbDialect;
use sqlparser::parser::Parser;

use crate::domain::result::{Error, Result};
use crate::migrations::Migration;
use crate::ports::database::Database;

const UP_MARKER: &str = "-- migrate:up";
const DOWN_MARKER: &str = "-- migrate:down";

/// A parsed migration script.
#[derive(Debug, Clone)]
pub struct SqlScript {
    pub up_sql: String,
    pub down_sql: String,
}

impl SqlScript {
    /// Split `source` into its up and down sections and syntax-check both,
    /// so malformed SQL is rejected before any statement runs.
    pub fn parse(name: &str, source: &str) -> Result<Self> {
        let up_start = source.find(UP_MARKER).ok_or_else(|| {
            Error::MalformedDefinition(name.to_string(), format!("missing '{}' marker", UP_MARKER))
        })?;
        let down_start = source[up_start..].find(DOWN_MARKER).ok_or_else(|| {
            Error::MalformedDefinition(
                name.to_string(),
                format!("missing '{}' marker", DOWN_MARKER),
            )
        })? + up_start;

        let up_sql = source[up_start + UP_MARKER.len()..down_start]
            .trim()
            .to_string();
        let down_sql = source[down_start + DOWN_MARKER.len()..].trim().to_string();

        validate_syntax(name, "up", &up_sql)?;
        validate_syntax(name, "down", &down_sql)?;

        Ok(Self { up_sql, down_sql })
    }
}

fn validate_syntax(name: &str, section: &str, sql: &str) -> Result<()> {
    if sql.is_empty() {
        return Ok(());
    }
    let dialect = DuckDbDialect {};
    Parser::parse_sql(&dialect, sql).map_err(|e| {
        let msg = e.to_string();
        let cleaned = msg.trim_start_matches("sql parser error: ");
        Error::MalformedDefinition(name.to_string(), format!("{} section: {}", section, cleaned))
    })?;
    Ok(())
}

/// File-backed migration capability.
///
/// The script is read and parsed when a procedure is invoked - lazily, at
/// most once per invocation, immediately before execution.
pub struct SqlFileMigration {
    name: String,
    path: PathBuf,
}

impl SqlFileMigration {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    fn load(&self) -> Result<SqlScript> {
        let source = fs::read_to_string(&self.path)?;
        SqlScript::parse(&self.name, &source)
    }
}

impl Migration for SqlFileMigration {
    fn up(&self, db: &dyn Database, database: &str) -> Result<()> {
        let script = self.load()?;
        if script.up_sql.is_empty() {
            return Ok(());
        }
        db.execute_batch(database, &script.up_sql)
    }

    fn down(&self, db: &dyn Database, database: &str) -> Result<()> {
        let script = self.load()?;
        if script.down_sql.is_empty() {
            return Err(Error::MalformedDefinition(
                self.name.clone(),
                "empty down section, cannot be reversed".to_string(),
            ));
        }
        db.execute_batch(database, &script.down_sql)
    }
}
