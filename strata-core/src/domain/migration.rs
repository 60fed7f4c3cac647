//! Migration naming rules
//!
//! A migration identifier is the definition's file name: a 14-digit UTC
//! timestamp prefix, an underscore, and a human-readable suffix (which
//! includes the file extension), e.g. `20150909082314_create_persons.sql`.
//! Ascending lexicographic order on identifiers is chronological order.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::result::{Error, Result};

/// Reserved alias naming the most recently applied migration.
pub const LAST_ALIAS: &str = "last";

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{14}_(.+)$").expect("name pattern compiles"));

static SLUG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("slug pattern compiles"));

/// Whether `name` is a well-formed migration identifier.
pub fn is_migration_name(name: &str) -> bool {
    NAME_PATTERN.is_match(name)
}

/// Validate a name given on the command line: the `last` alias or a
/// well-formed identifier. No side effects.
pub fn validate_name(name: &str) -> Result<()> {
    if name == LAST_ALIAS || is_migration_name(name) {
        Ok(())
    } else {
        Err(Error::InvalidMigrationName(name.to_string()))
    }
}

/// Validate the human-readable suffix passed to `generate`.
pub fn validate_slug(slug: &str) -> Result<()> {
    if SLUG_PATTERN.is_match(slug) {
        Ok(())
    } else {
        Err(Error::InvalidMigrationName(slug.to_string()))
    }
}
