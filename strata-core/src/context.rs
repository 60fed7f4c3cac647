//! Invocation context
//!
//! Explicit, per-invocation configuration threaded into the services instead
//! of process-wide mutable state, so repeated invocations in one process
//! (tests above all) stay isolated. `set` is called once at the top of each
//! command before anything relies on `database()`.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use crate::domain::result::{Error, Result};

/// Target and output configuration for one command invocation.
pub struct Context {
    database: Option<String>,
    port: Option<u16>,
    sink: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl Context {
    /// A context with no target and stdout as the output sink.
    pub fn new() -> Self {
        Self {
            database: None,
            port: None,
            sink: Arc::new(Mutex::new(Box::new(io::stdout()))),
        }
    }

    /// Set the migration target. Overwrites any previous target; never fails.
    pub fn set(&mut self, database: Option<String>, port: Option<u16>) {
        self.database = database;
        self.port = port;
    }

    /// The target database name. An unset or empty name is a hard
    /// precondition failure for any operation that needs a database.
    pub fn database(&self) -> Result<&str> {
        match self.database.as_deref() {
            Some(name) if !name.is_empty() => Ok(name),
            _ => Err(Error::NoDatabaseSpecified),
        }
    }

    /// Server port, when the backing store has a use for one.
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Replace the output sink (stdout by default).
    pub fn set_output(&mut self, sink: Box<dyn Write + Send>) {
        self.sink = Arc::new(Mutex::new(sink));
    }

    /// Report a progress line. Reporting never fails the surrounding
    /// operation.
    pub fn write_line(&self, line: &str) {
        let mut sink = self.sink.lock().unwrap();
        let _ = writeln!(sink, "{}", line);
        let _ = sink.flush();
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
