//! Core domain - naming rules and error types

pub mod migration;
pub mod result;

pub use migration::{is_migration_name, validate_name, validate_slug, LAST_ALIAS};
pub use result::{Error, Result};
