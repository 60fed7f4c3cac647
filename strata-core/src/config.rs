//! Configuration management
//!
//! The migrations directory carries a `strata.json` declaring the target:
//! ```json
//! { "db": "app", "port": 28015, "dataDir": "/var/lib/strata" }
//! ```
//! `db` is required and non-empty. A missing file is not an error in itself
//! (the target may come from the command line); a file that cannot be read
//! or parsed is, and that failure is distinct from a missing directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};

/// Config file name inside the migrations directory.
pub const CONFIG_FILE: &str = "strata.json";

/// Environment override for where database files live.
const DATA_DIR_ENV: &str = "STRATA_DATA_DIR";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Target database name.
    pub db: String,
    #[serde(default)]
    pub port: Option<u16>,
    /// Optional override for the data directory.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

impl Config {
    /// Load `strata.json` from the migrations directory, if present.
    pub fn try_load(migrations_dir: &Path) -> Result<Option<Config>> {
        let path = migrations_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)
            .map_err(|e| Error::config(format!("cannot read {}: {}", path.display(), e)))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| Error::config(format!("{} is malformed: {}", path.display(), e)))?;
        if config.db.is_empty() {
            return Err(Error::config(format!(
                "{} must declare a non-empty 'db'",
                path.display()
            )));
        }
        Ok(Some(config))
    }
}

/// Where the store keeps its database files.
///
/// Resolution order: `STRATA_DATA_DIR`, then the config file's `dataDir`,
/// then `~/.strata`.
pub fn resolve_data_dir(config: Option<&Config>) -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }
    if let Some(dir) = config.and_then(|c| c.data_dir.clone()) {
        return dir;
    }
    dirs::home_dir()
        .map(|home| home.join(".strata"))
        .unwrap_or_else(|| PathBuf::from(".strata"))
}
