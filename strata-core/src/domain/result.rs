//! Result and error types for the core library

use thiserror::Error;

/// Core library error type
///
/// One closed set of failure kinds for the whole engine. Validation failures
/// (`MissingDirectory`, `MissingOrMalformedConfig`, naming) abort the current
/// command and are reported verbatim. `MissingDatabase` and
/// `MissingLedgerTable` are recoverable signals consumed by the ledger's
/// ensure/list paths and never reach the user.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Missing migrations directory")]
    MissingDirectory,

    #[error("Invalid migrations config: {0}")]
    MissingOrMalformedConfig(String),

    #[error("No database specified")]
    NoDatabaseSpecified,

    #[error("Database '{0}' does not exist")]
    MissingDatabase(String),

    #[error("Table '{0}' does not exist")]
    MissingLedgerTable(String),

    #[error("'{0}' is not a valid migration name")]
    InvalidMigrationName(String),

    #[error("'{0}' does not match any applied migration")]
    InvalidMigrationReference(String),

    #[error("No migrations have been applied")]
    NoMigrationsApplied,

    #[error("Migration '{0}' is malformed: {1}")]
    MalformedDefinition(String, String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a database error
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::MissingOrMalformedConfig(msg.into())
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;
