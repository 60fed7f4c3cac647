//! Integration tests for the strata migration engine
//!
//! These tests drive the real DuckDB store through the public services.
//! Definitions are real SQL script files in a temp migrations directory;
//! every database lives in a per-test temp data directory.
//!
//! Run with: cargo test --test integration_tests -- --nocapture

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use strata_core::ports::database::Database;
use strata_core::{Context, Error, StrataContext};

const CREATE_PERSONS: &str = "20150909082314_createPersons.sql";

// ============================================================================
// Test Helpers
// ============================================================================

struct Harness {
    _tmp: TempDir,
    migrations_dir: PathBuf,
    strata: StrataContext,
}

/// Create a migrations directory and a store rooted in the same temp dir.
fn setup() -> Harness {
    let tmp = TempDir::new().unwrap();
    let migrations_dir = tmp.path().join("migrations");
    fs::create_dir(&migrations_dir).unwrap();
    let data_dir = tmp.path().join("data");
    let strata = StrataContext::new(&migrations_dir, &data_dir).unwrap();
    Harness {
        _tmp: tmp,
        migrations_dir,
        strata,
    }
}

/// A context targeting `app` with a silent output sink.
fn app_context() -> Context {
    let mut ctx = Context::new();
    ctx.set(Some("app".to_string()), None);
    ctx.set_output(Box::new(io::sink()));
    ctx
}

/// Shared buffer sink for asserting progress reporting.
#[derive(Clone)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    fn new() -> Self {
        Self(Arc::new(Mutex::new(Vec::new())))
    }

    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn write_migration(dir: &Path, name: &str, up: &str, down: &str) {
    fs::write(
        dir.join(name),
        format!("-- migrate:up\n{}\n\n-- migrate:down\n{}\n", up, down),
    )
    .unwrap();
}

fn write_create_persons(dir: &Path) {
    write_migration(
        dir,
        CREATE_PERSONS,
        "CREATE TABLE persons (id INTEGER, name VARCHAR);",
        "DROP TABLE persons;",
    );
}

// ============================================================================
// Status Scenarios
// ============================================================================

/// Scenario A: empty migrations directory reports 0 applied, 0 pending.
#[test]
fn test_status_on_empty_directory() {
    let h = setup();
    let ctx = app_context();

    let summary = h.strata.status.status(&ctx).unwrap();
    assert_eq!(summary.total_applied, 0);
    assert_eq!(summary.total_pending, 0);
    assert!(summary.applied.is_empty());
    assert!(summary.pending.is_empty());
}

#[test]
fn test_status_requires_the_migrations_directory() {
    let h = setup();
    fs::remove_dir(&h.migrations_dir).unwrap();
    let ctx = app_context();

    assert!(matches!(
        h.strata.status.status(&ctx),
        Err(Error::MissingDirectory)
    ));
}

// ============================================================================
// Up Scenarios
// ============================================================================

/// Scenario B: a pending definition but no configured database.
#[test]
fn test_up_without_database_fails() {
    let h = setup();
    write_create_persons(&h.migrations_dir);
    let ctx = Context::new(); // no target set

    assert!(matches!(
        h.strata.executor.run_pending(&ctx),
        Err(Error::NoDatabaseSpecified)
    ));
}

/// Scenario C: one definition, fresh target. Up applies it, records it, and
/// reports it; afterwards nothing is pending.
#[test]
fn test_up_applies_and_records() {
    let h = setup();
    write_create_persons(&h.migrations_dir);

    let capture = Capture::new();
    let mut ctx = Context::new();
    ctx.set(Some("app".to_string()), None);
    ctx.set_output(Box::new(capture.clone()));

    let applied = h.strata.executor.run_pending(&ctx).unwrap();
    assert_eq!(applied, vec![CREATE_PERSONS.to_string()]);
    assert_eq!(capture.contents(), format!("applied {}\n", CREATE_PERSONS));

    // the migration's effect and the ledger record are both observable
    let tables = h.strata.store.list_tables("app").unwrap();
    assert!(tables.contains(&"persons".to_string()));
    assert!(tables.contains(&"sys_migrations".to_string()));

    let summary = h.strata.status.status(&ctx).unwrap();
    assert_eq!(summary.applied, vec![CREATE_PERSONS.to_string()]);
    assert_eq!(summary.total_pending, 0);
}

#[test]
fn test_up_with_nothing_pending_applies_nothing() {
    let h = setup();
    write_create_persons(&h.migrations_dir);
    let ctx = app_context();

    h.strata.executor.run_pending(&ctx).unwrap();
    let second = h.strata.executor.run_pending(&ctx).unwrap();
    assert!(second.is_empty());
}

#[test]
fn test_pending_is_definitions_minus_applied() {
    let h = setup();
    write_migration(&h.migrations_dir, "20150101000000_a.sql", "CREATE TABLE a (x INTEGER);", "DROP TABLE a;");
    write_migration(&h.migrations_dir, "20160101000000_b.sql", "CREATE TABLE b (x INTEGER);", "DROP TABLE b;");
    write_migration(&h.migrations_dir, "20170101000000_c.sql", "CREATE TABLE c (x INTEGER);", "DROP TABLE c;");
    let ctx = app_context();

    // apply only the middle definition
    h.strata
        .executor
        .apply_up(&ctx, "20160101000000_b.sql")
        .unwrap();

    let pending = h.strata.scheduler.pending(&ctx).unwrap();
    assert_eq!(
        pending,
        vec![
            "20150101000000_a.sql".to_string(),
            "20170101000000_c.sql".to_string(),
        ]
    );
}

#[test]
fn test_batch_runs_in_ascending_order() {
    let h = setup();
    // each migration appends to a shared table; out-of-order execution would
    // fail (the table would not exist) or land in the wrong position
    write_migration(
        &h.migrations_dir,
        "20150101000000_first.sql",
        "CREATE TABLE events (pos INTEGER, label VARCHAR); INSERT INTO events VALUES (1, 'first');",
        "DROP TABLE events;",
    );
    write_migration(
        &h.migrations_dir,
        "20160101000000_second.sql",
        "INSERT INTO events VALUES (2, 'second');",
        "DELETE FROM events WHERE pos = 2;",
    );
    write_migration(
        &h.migrations_dir,
        "20170101000000_third.sql",
        "INSERT INTO events VALUES (3, 'third');",
        "DELETE FROM events WHERE pos = 3;",
    );
    let ctx = app_context();

    let applied = h.strata.executor.run_pending(&ctx).unwrap();
    assert_eq!(
        applied,
        vec![
            "20150101000000_first.sql".to_string(),
            "20160101000000_second.sql".to_string(),
            "20170101000000_third.sql".to_string(),
        ]
    );

    let rows = h.strata.store.scan("app", "events", "pos").unwrap();
    let labels: Vec<&str> = rows
        .iter()
        .filter_map(|r| r.get("label").and_then(serde_json::Value::as_str))
        .collect();
    assert_eq!(labels, vec!["first", "second", "third"]);
}

#[test]
fn test_batch_halts_at_first_failure() {
    let h = setup();
    write_migration(&h.migrations_dir, "20150101000000_a.sql", "CREATE TABLE a (x INTEGER);", "DROP TABLE a;");
    // parses fine, fails at execution: the table does not exist
    write_migration(&h.migrations_dir, "20160101000000_b.sql", "INSERT INTO ghost VALUES (1);", "");
    write_migration(&h.migrations_dir, "20170101000000_c.sql", "CREATE TABLE c (x INTEGER);", "DROP TABLE c;");
    let ctx = app_context();

    let err = h.strata.executor.run_pending(&ctx).unwrap_err();
    assert!(matches!(err, Error::Database(_)), "{err:?}");

    // everything before the failure is recorded; the failing migration and
    // everything after are still pending
    let summary = h.strata.status.status(&ctx).unwrap();
    assert_eq!(summary.applied, vec!["20150101000000_a.sql".to_string()]);
    assert_eq!(
        summary.pending,
        vec![
            "20160101000000_b.sql".to_string(),
            "20170101000000_c.sql".to_string(),
        ]
    );
    // the failed batch left no partial ledger state for migration c
    assert!(!h
        .strata
        .store
        .list_tables("app")
        .unwrap()
        .contains(&"c".to_string()));
}

#[test]
fn test_malformed_definition_fails_without_running() {
    let h = setup();
    write_migration(&h.migrations_dir, "20150101000000_bad.sql", "CREATE TABEL broken;", "");
    let ctx = app_context();

    let err = h.strata.executor.run_pending(&ctx).unwrap_err();
    assert!(matches!(err, Error::MalformedDefinition(_, _)), "{err:?}");
    assert!(h.strata.status.status(&ctx).unwrap().applied.is_empty());
}

// ============================================================================
// Down Scenarios
// ============================================================================

/// Scenario D: reversing the last applied migration empties the ledger and
/// the migration's own down effect is observable.
#[test]
fn test_down_last_round_trips() {
    let h = setup();
    write_create_persons(&h.migrations_dir);

    let capture = Capture::new();
    let mut ctx = Context::new();
    ctx.set(Some("app".to_string()), None);
    ctx.set_output(Box::new(capture.clone()));

    h.strata.executor.run_pending(&ctx).unwrap();
    let reverted = h.strata.executor.apply_down(&ctx, "last").unwrap();
    assert_eq!(reverted, CREATE_PERSONS);
    assert!(capture
        .contents()
        .contains(&format!("reverted {}", CREATE_PERSONS)));

    let summary = h.strata.status.status(&ctx).unwrap();
    assert!(summary.applied.is_empty());
    assert_eq!(summary.pending, vec![CREATE_PERSONS.to_string()]);

    // the dropped table is gone
    assert!(!h
        .strata
        .store
        .list_tables("app")
        .unwrap()
        .contains(&"persons".to_string()));
}

#[test]
fn test_down_last_with_empty_ledger() {
    let h = setup();
    let ctx = app_context();

    assert!(matches!(
        h.strata.executor.apply_down(&ctx, "last"),
        Err(Error::NoMigrationsApplied)
    ));
}

/// Scenario E: a well-formed but unapplied identifier fails without touching
/// the ledger.
#[test]
fn test_down_unapplied_reference() {
    let h = setup();
    write_create_persons(&h.migrations_dir);
    let ctx = app_context();
    h.strata.executor.run_pending(&ctx).unwrap();

    let err = h
        .strata
        .executor
        .apply_down(&ctx, "20990101000000_missing.sql")
        .unwrap_err();
    assert!(matches!(err, Error::InvalidMigrationReference(_)));

    let summary = h.strata.status.status(&ctx).unwrap();
    assert_eq!(summary.applied, vec![CREATE_PERSONS.to_string()]);
}

#[test]
fn test_down_garbage_name() {
    let h = setup();
    write_create_persons(&h.migrations_dir);
    let ctx = app_context();

    assert!(matches!(
        h.strata.executor.apply_down(&ctx, "definitely-not-a-migration"),
        Err(Error::InvalidMigrationName(_))
    ));
}

#[test]
fn test_down_a_middle_migration_by_name() {
    let h = setup();
    write_migration(&h.migrations_dir, "20150101000000_a.sql", "CREATE TABLE a (x INTEGER);", "DROP TABLE a;");
    write_migration(&h.migrations_dir, "20160101000000_b.sql", "CREATE TABLE b (x INTEGER);", "DROP TABLE b;");
    write_migration(&h.migrations_dir, "20170101000000_c.sql", "CREATE TABLE c (x INTEGER);", "DROP TABLE c;");
    let ctx = app_context();
    h.strata.executor.run_pending(&ctx).unwrap();

    h.strata
        .executor
        .apply_down(&ctx, "20160101000000_b.sql")
        .unwrap();

    let summary = h.strata.status.status(&ctx).unwrap();
    // insertion order of the remaining records is untouched
    assert_eq!(
        summary.applied,
        vec![
            "20150101000000_a.sql".to_string(),
            "20170101000000_c.sql".to_string(),
        ]
    );
    assert_eq!(summary.pending, vec!["20160101000000_b.sql".to_string()]);
}

#[test]
fn test_reapply_after_revert() {
    let h = setup();
    write_create_persons(&h.migrations_dir);
    let ctx = app_context();

    h.strata.executor.run_pending(&ctx).unwrap();
    h.strata.executor.apply_down(&ctx, "last").unwrap();
    let applied = h.strata.executor.run_pending(&ctx).unwrap();

    assert_eq!(applied, vec![CREATE_PERSONS.to_string()]);
    assert!(h
        .strata
        .store
        .list_tables("app")
        .unwrap()
        .contains(&"persons".to_string()));
}

// ============================================================================
// Ledger Policy
// ============================================================================

/// A ledger record whose definition file was deleted stays visible as
/// applied, is never scheduled, and cannot be reversed.
#[test]
fn test_dangling_ledger_record() {
    let h = setup();
    write_create_persons(&h.migrations_dir);
    let ctx = app_context();
    h.strata.executor.run_pending(&ctx).unwrap();

    fs::remove_file(h.migrations_dir.join(CREATE_PERSONS)).unwrap();

    let summary = h.strata.status.status(&ctx).unwrap();
    assert_eq!(summary.applied, vec![CREATE_PERSONS.to_string()]);
    assert!(summary.pending.is_empty());

    assert!(matches!(
        h.strata.executor.apply_down(&ctx, "last"),
        Err(Error::InvalidMigrationReference(_))
    ));
    // the failed down left the record in place
    assert_eq!(h.strata.status.status(&ctx).unwrap().total_applied, 1);
}

// ============================================================================
// Generate
// ============================================================================

#[test]
fn test_generated_stub_is_schedulable() {
    let h = setup();
    let ctx = app_context();

    let path = h.strata.generator.generate("create_persons").unwrap();
    let name = path.file_name().unwrap().to_str().unwrap().to_string();

    let pending = h.strata.scheduler.pending(&ctx).unwrap();
    assert_eq!(pending, vec![name.clone()]);

    // an empty stub applies cleanly and records itself
    let applied = h.strata.executor.run_pending(&ctx).unwrap();
    assert_eq!(applied, vec![name]);
}
