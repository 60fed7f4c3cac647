//! The migrations directory - the file-defined set of definitions

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::migration::is_migration_name;
use crate::domain::result::{Error, Result};

/// Read-only view over the well-known migrations location.
///
/// Entries that do not match the identifier pattern (the config file,
/// editor droppings) are silently ignored.
#[derive(Debug, Clone)]
pub struct MigrationDirectory {
    path: PathBuf,
}

impl MigrationDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fail with `MissingDirectory` unless the location exists and is a
    /// directory.
    pub fn ensure_exists(&self) -> Result<()> {
        match fs::metadata(&self.path) {
            Ok(meta) if meta.is_dir() => Ok(()),
            _ => Err(Error::MissingDirectory),
        }
    }

    /// Identifiers of all definitions, ascending. Never mutates anything.
    pub fn list(&self) -> Result<Vec<String>> {
        self.ensure_exists()?;
        let mut names: Vec<String> = fs::read_dir(&self.path)?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| is_migration_name(name))
            .collect();
        names.sort();
        Ok(names)
    }
}
