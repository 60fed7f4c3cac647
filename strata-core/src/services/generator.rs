//! Generator service - new migration stubs

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use chrono::Utc;

use crate::domain::migration::validate_slug;
use crate::domain::result::Result;
use crate::migrations::MigrationDirectory;

/// Contents of a freshly generated definition.
const STUB: &str = "-- migrate:up\n\n\n-- migrate:down\n\n";

/// Service creating empty migration definitions
pub struct GeneratorService {
    directory: MigrationDirectory,
}

impl GeneratorService {
    pub fn new(directory: MigrationDirectory) -> Self {
        Self { directory }
    }

    /// Write `<timestamp>_<slug>.sql` with empty up and down sections and
    /// return its path. Refuses to overwrite an existing file.
    pub fn generate(&self, slug: &str) -> Result<PathBuf> {
        self.directory.ensure_exists()?;
        validate_slug(slug)?;

        let stamp = Utc::now().format("%Y%m%d%H%M%S");
        let path = self.directory.path().join(format!("{}_{}.sql", stamp, slug));

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)?;
        file.write_all(STUB.as_bytes())?;
        Ok(path)
    }
}
