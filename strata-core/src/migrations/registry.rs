//! Migration registry - identifier to capability mapping
//!
//! Built at the start of each command invocation, before anything executes.
//! File-backed definitions come from [`MigrationRegistry::from_directory`];
//! tests register programmatic capabilities through [`MigrationRegistry::register`].

use std::collections::BTreeMap;

use crate::domain::migration::is_migration_name;
use crate::domain::result::{Error, Result};
use crate::migrations::{Migration, MigrationDirectory, SqlFileMigration};

/// Registered migration capabilities, ordered ascending by identifier.
#[derive(Default)]
pub struct MigrationRegistry {
    entries: BTreeMap<String, Box<dyn Migration>>,
}

impl MigrationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every definition file in the directory.
    pub fn from_directory(dir: &MigrationDirectory) -> Result<Self> {
        let mut registry = Self::new();
        for name in dir.list()? {
            let path = dir.path().join(&name);
            registry.register(name.clone(), Box::new(SqlFileMigration::new(name, path)))?;
        }
        Ok(registry)
    }

    /// Register a capability under a well-formed identifier.
    pub fn register(&mut self, name: impl Into<String>, migration: Box<dyn Migration>) -> Result<()> {
        let name = name.into();
        if !is_migration_name(&name) {
            return Err(Error::InvalidMigrationName(name));
        }
        self.entries.insert(name, migration);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&dyn Migration> {
        self.entries.get(name).map(|m| m.as_ref())
    }

    /// Registered identifiers, ascending.
    pub fn names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
