//! Tests for version resolution, transitions, rollback, and planning.

use super::*;
use crate::migration::SimpleMigration;
use crate::source::{from_fn, MigrationList};
use std::cell::RefCell;

// ── Helpers ────────────────────────────────────────────────────────────

/// Trivial reversible migration for every version.
fn noop_source() -> impl MigrationSource {
    from_fn(|_| {
        Some(Box::new(SimpleMigration::reversible("test", "SELECT 1", "SELECT 1"))
            as Box<dyn Migration>)
    })
}

/// Migrations that create `t1`, `t2`, `t3`, one table per version.
fn table_source() -> MigrationList {
    (1..=3).fold(MigrationList::new(), |list, n| {
        list.with(SimpleMigration::reversible(
            format!("create_t{n}"),
            format!("CREATE TABLE t{n} (id INTEGER)"),
            format!("DROP TABLE t{n}"),
        ))
    })
}

/// Records every version it is asked for.
struct RecordingSource<S> {
    inner: S,
    visited: RefCell<Vec<Version>>,
}

impl<S> RecordingSource<S> {
    fn new(inner: S) -> Self {
        Self {
            inner,
            visited: RefCell::new(Vec::new()),
        }
    }

    fn take_visited(&self) -> Vec<Version> {
        self.visited.take()
    }
}

impl<S: MigrationSource> MigrationSource for RecordingSource<S> {
    fn get_migration(&self, version: Version) -> Option<Box<dyn Migration + '_>> {
        self.visited.borrow_mut().push(version);
        self.inner.get_migration(version)
    }
}

fn table_exists(conn: &Connection, table: &str) -> bool {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = ?",
            duckdb::params![table],
            |row| row.get(0),
        )
        .unwrap();
    count > 0
}

fn record_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM migrations", [], |row| row.get(0))
        .unwrap()
}

// ── Current version ────────────────────────────────────────────────────

#[test]
fn test_fresh_database_is_version_zero() {
    let mut conn = Connection::open_in_memory().unwrap();
    let mut migrator = Migrator::new(&mut conn, noop_source());
    assert_eq!(migrator.current_version().unwrap(), 0);
    assert!(table_exists(migrator.conn(), "migrations"));
}

#[test]
fn test_current_version_is_repeatable() {
    let mut conn = Connection::open_in_memory().unwrap();
    let mut migrator = Migrator::new(&mut conn, noop_source());
    migrator.migrate_to_version(2).unwrap();
    assert_eq!(migrator.current_version().unwrap(), 2);
    assert_eq!(migrator.current_version().unwrap(), 2);
}

// ── Transitions ────────────────────────────────────────────────────────

#[test]
fn test_end_to_end_up_and_down() {
    let mut conn = Connection::open_in_memory().unwrap();
    let mut migrator = Migrator::new(&mut conn, noop_source());

    for target in [5, 10, 5, 0] {
        migrator.migrate_to_version(target).unwrap();
        assert_eq!(migrator.current_version().unwrap(), target);
        assert_eq!(record_count(migrator.conn()), i64::from(target));
    }
}

#[test]
fn test_downgrade_removes_only_higher_records() {
    let mut conn = Connection::open_in_memory().unwrap();
    let mut migrator = Migrator::new(&mut conn, noop_source());
    migrator.migrate_to_version(10).unwrap();
    migrator.migrate_to_version(5).unwrap();

    let versions: Vec<Version> = migrator
        .applied()
        .unwrap()
        .into_iter()
        .map(|r| r.version)
        .collect();
    assert_eq!(versions, vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_up_then_down_to_zero_leaves_empty_table() {
    for n in [0, 1, 3, 7] {
        let mut conn = Connection::open_in_memory().unwrap();
        let mut migrator = Migrator::new(&mut conn, noop_source());
        migrator.migrate_to_version(n).unwrap();
        migrator.migrate_to_version(0).unwrap();
        assert_eq!(record_count(migrator.conn()), 0, "n = {n}");
    }
}

#[test]
fn test_migrate_to_current_is_noop() {
    let mut conn = Connection::open_in_memory().unwrap();
    let source = RecordingSource::new(noop_source());
    let mut migrator = Migrator::new(&mut conn, &source);
    migrator.migrate_to_version(3).unwrap();
    let before = migrator.applied().unwrap();
    source.take_visited();

    let transition = migrator.migrate_to_version(3).unwrap();

    assert!(transition.is_noop());
    assert_eq!(transition.direction, Direction::Unchanged);
    assert_eq!(migrator.applied().unwrap(), before);
    assert!(source.take_visited().is_empty());
}

#[test]
fn test_upgrade_applies_schema_and_records_names() {
    let mut conn = Connection::open_in_memory().unwrap();
    let mut migrator = Migrator::new(&mut conn, table_source());

    let transition = migrator.migrate_to_version(3).unwrap();
    assert_eq!(
        transition,
        Transition {
            from: 0,
            to: 3,
            direction: Direction::Up,
            steps: vec![1, 2, 3],
        }
    );
    for table in ["t1", "t2", "t3"] {
        assert!(table_exists(migrator.conn(), table));
    }

    let names: Vec<String> = migrator
        .applied()
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(names, vec!["create_t1", "create_t2", "create_t3"]);
}

#[test]
fn test_downgrade_reverts_in_descending_order() {
    let mut conn = Connection::open_in_memory().unwrap();
    let source = RecordingSource::new(table_source());
    let mut migrator = Migrator::new(&mut conn, &source);
    migrator.migrate_to_version(3).unwrap();
    assert_eq!(source.take_visited(), vec![1, 2, 3]);

    let transition = migrator.migrate_to_version(1).unwrap();
    assert_eq!(transition.direction, Direction::Down);
    assert_eq!(transition.steps, vec![3, 2]);
    assert_eq!(source.take_visited(), vec![3, 2]);

    assert!(table_exists(migrator.conn(), "t1"));
    assert!(!table_exists(migrator.conn(), "t2"));
    assert!(!table_exists(migrator.conn(), "t3"));
}

#[test]
fn test_versions_outside_transition_are_never_requested() {
    let mut conn = Connection::open_in_memory().unwrap();
    let source = RecordingSource::new(table_source());
    let mut migrator = Migrator::new(&mut conn, &source);
    migrator.migrate_to_version(2).unwrap();
    migrator.migrate_to_version(3).unwrap();
    assert_eq!(source.take_visited(), vec![1, 2, 3]);
}

// ── Failure and rollback ───────────────────────────────────────────────

#[test]
fn test_missing_migration_rolls_back() {
    let mut conn = Connection::open_in_memory().unwrap();
    let source = from_fn(|version| {
        (version != 3).then(|| {
            Box::new(SimpleMigration::reversible(
                format!("create_t{version}"),
                format!("CREATE TABLE t{version} (id INTEGER)"),
                format!("DROP TABLE t{version}"),
            )) as Box<dyn Migration>
        })
    });
    let mut migrator = Migrator::new(&mut conn, source);

    let err = migrator.migrate_to_version(5).unwrap_err();
    assert!(matches!(err, MigrateError::MissingMigration { version: 3 }));
    assert_eq!(migrator.current_version().unwrap(), 0);
    // Steps 1 and 2 ran before the gap was hit and must be gone
    assert!(!table_exists(migrator.conn(), "t1"));
    assert!(!table_exists(migrator.conn(), "t2"));

    // Below the gap still works
    migrator.migrate_to_version(2).unwrap();
    assert_eq!(migrator.current_version().unwrap(), 2);
}

#[test]
fn test_migrate_to_max_version_reports_first_missing() {
    let mut conn = Connection::open_in_memory().unwrap();
    let mut migrator = Migrator::new(&mut conn, MigrationList::new());
    let err = migrator.migrate_to_version(Version::MAX).unwrap_err();
    assert!(matches!(err, MigrateError::MissingMigration { version: 1 }));
    assert_eq!(migrator.current_version().unwrap(), 0);
}

#[test]
fn test_unrecordable_version_is_rejected_before_upgrade() {
    let mut conn = Connection::open_in_memory().unwrap();
    let table = BookkeepingTable::default();
    bookkeeping::ensure_table(&conn, &table).unwrap();
    bookkeeping::record_upgrade(&conn, &table, bookkeeping::MAX_RECORDED_VERSION, "last")
        .unwrap();

    let source = from_fn(|version| {
        Some(Box::new(SimpleMigration::new(
            format!("create_t{version}"),
            "CREATE TABLE beyond (id INTEGER)",
        )) as Box<dyn Migration>)
    });
    let mut migrator = Migrator::new(&mut conn, source);
    let target = bookkeeping::MAX_RECORDED_VERSION + 1;

    let err = migrator.migrate_to_version(target).unwrap_err();
    assert!(matches!(
        err,
        MigrateError::VersionOutOfRange { version, max }
            if version == target && max == bookkeeping::MAX_RECORDED_VERSION
    ));
    assert!(!table_exists(migrator.conn(), "beyond"));
    assert_eq!(
        migrator.current_version().unwrap(),
        bookkeeping::MAX_RECORDED_VERSION
    );

    let err = migrator.plan(target).unwrap_err();
    assert!(matches!(err, MigrateError::VersionOutOfRange { .. }));
}

#[test]
fn test_missing_migration_on_downgrade_rolls_back() {
    let mut conn = Connection::open_in_memory().unwrap();
    Migrator::new(&mut conn, noop_source())
        .migrate_to_version(4)
        .unwrap();

    let partial = from_fn(|version| {
        (version >= 3).then(|| {
            Box::new(SimpleMigration::reversible("test", "SELECT 1", "SELECT 1"))
                as Box<dyn Migration>
        })
    });
    let mut migrator = Migrator::new(&mut conn, partial);
    let err = migrator.migrate_to_version(0).unwrap_err();
    assert!(matches!(err, MigrateError::MissingMigration { version: 2 }));
    assert_eq!(migrator.current_version().unwrap(), 4);
    assert_eq!(record_count(migrator.conn()), 4);
}

#[test]
fn test_unsupported_downgrade_rolls_back() {
    let mut conn = Connection::open_in_memory().unwrap();
    let source = MigrationList::new()
        .with(SimpleMigration::reversible(
            "create_a",
            "CREATE TABLE a (id INTEGER)",
            "DROP TABLE a",
        ))
        .with(SimpleMigration::new("create_b", "CREATE TABLE b (id INTEGER)"))
        .with(SimpleMigration::reversible(
            "create_c",
            "CREATE TABLE c (id INTEGER)",
            "DROP TABLE c",
        ));
    let mut migrator = Migrator::new(&mut conn, source);
    migrator.migrate_to_version(3).unwrap();

    let err = migrator.migrate_to_version(0).unwrap_err();
    match err {
        MigrateError::UnsupportedDowngrade { name } => assert_eq!(name, "create_b"),
        other => panic!("expected UnsupportedDowngrade, got {other:?}"),
    }
    assert_eq!(migrator.current_version().unwrap(), 3);
    // Version 3 was reverted before version 2 refused; that must be undone
    assert!(table_exists(migrator.conn(), "c"));
    assert_eq!(record_count(migrator.conn()), 3);

    // Reversible steps above the irreversible one still work
    migrator.migrate_to_version(2).unwrap();
    assert!(!table_exists(migrator.conn(), "c"));
}

#[test]
fn test_failing_upgrade_rolls_back_earlier_steps() {
    let mut conn = Connection::open_in_memory().unwrap();
    let source = MigrationList::new()
        .with(SimpleMigration::new("create_a", "CREATE TABLE a (id INTEGER)"))
        .with(SimpleMigration::new(
            "seed_a",
            "INSERT INTO a VALUES (1), (2)",
        ))
        .with(SimpleMigration::new("broken", "INSERT INTO missing VALUES (1)"));
    let mut migrator = Migrator::new(&mut conn, source);

    let err = migrator.migrate_to_version(3).unwrap_err();
    assert!(matches!(err, MigrateError::Store(_)));
    assert_eq!(migrator.current_version().unwrap(), 0);
    assert!(!table_exists(migrator.conn(), "a"));
}

#[test]
fn test_retry_after_fixing_source_succeeds() {
    let mut conn = Connection::open_in_memory().unwrap();
    let broken = MigrationList::new()
        .with(SimpleMigration::new("create_a", "CREATE TABLE a (id INTEGER)"))
        .with(SimpleMigration::new("broken", "CREATE TABLE ("));
    assert!(Migrator::new(&mut conn, broken)
        .migrate_to_version(2)
        .is_err());

    let fixed = MigrationList::new()
        .with(SimpleMigration::new("create_a", "CREATE TABLE a (id INTEGER)"))
        .with(SimpleMigration::new("create_b", "CREATE TABLE b (id INTEGER)"));
    let mut migrator = Migrator::new(&mut conn, fixed);
    migrator.migrate_to_version(2).unwrap();
    assert_eq!(migrator.current_version().unwrap(), 2);
}

// ── Custom table ───────────────────────────────────────────────────────

#[test]
fn test_custom_bookkeeping_table() {
    let mut conn = Connection::open_in_memory().unwrap();
    let table = BookkeepingTable::new("ops.schema_history").unwrap();
    let mut migrator = Migrator::with_table(&mut conn, noop_source(), table);
    migrator.migrate_to_version(2).unwrap();
    assert_eq!(migrator.table().to_string(), "ops.schema_history");

    let count: i64 = migrator
        .conn()
        .query_row("SELECT COUNT(*) FROM ops.schema_history", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(count, 2);
    assert!(!table_exists(migrator.conn(), "migrations"));
}

// ── Planning ───────────────────────────────────────────────────────────

#[test]
fn test_plan_lists_steps_without_running() {
    let mut conn = Connection::open_in_memory().unwrap();
    let mut migrator = Migrator::new(&mut conn, table_source());

    let plan = migrator.plan(2).unwrap();
    assert_eq!(plan.from, 0);
    assert_eq!(plan.to, 2);
    assert_eq!(plan.direction, Direction::Up);
    let names: Vec<&str> = plan.steps.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["create_t1", "create_t2"]);

    assert_eq!(migrator.current_version().unwrap(), 0);
    assert!(!table_exists(migrator.conn(), "t1"));
}

#[test]
fn test_plan_downgrade_order() {
    let mut conn = Connection::open_in_memory().unwrap();
    let mut migrator = Migrator::new(&mut conn, table_source());
    migrator.migrate_to_version(3).unwrap();

    let plan = migrator.plan(0).unwrap();
    let versions: Vec<Version> = plan.steps.iter().map(|s| s.version).collect();
    assert_eq!(versions, vec![3, 2, 1]);
    assert!(plan.steps.iter().all(|s| s.direction == Direction::Down));
}

#[test]
fn test_plan_reports_missing_migration() {
    let mut conn = Connection::open_in_memory().unwrap();
    let mut migrator = Migrator::new(&mut conn, table_source());
    let err = migrator.plan(5).unwrap_err();
    assert!(matches!(err, MigrateError::MissingMigration { version: 4 }));
}

#[test]
fn test_plan_to_current_is_empty() {
    let mut conn = Connection::open_in_memory().unwrap();
    let mut migrator = Migrator::new(&mut conn, table_source());
    let plan = migrator.plan(0).unwrap();
    assert_eq!(plan.direction, Direction::Unchanged);
    assert!(plan.steps.is_empty());
}

#[test]
fn test_plan_to_max_version_reports_first_missing() {
    let mut conn = Connection::open_in_memory().unwrap();
    let mut migrator = Migrator::new(&mut conn, MigrationList::new());
    let err = migrator.plan(Version::MAX).unwrap_err();
    assert!(matches!(err, MigrateError::MissingMigration { version: 1 }));
}

#[test]
fn test_step_versions() {
    let collect = |from, to| step_versions(from, to).collect::<Vec<Version>>();
    assert_eq!(collect(0, 3), vec![1, 2, 3]);
    assert_eq!(collect(5, 2), vec![5, 4, 3]);
    assert_eq!(collect(4, 4), Vec::<Version>::new());
}

#[test]
fn test_step_versions_is_lazy_over_full_range() {
    let mut steps = step_versions(0, Version::MAX);
    assert_eq!(steps.next(), Some(1));
    assert_eq!(steps.next(), Some(2));

    let mut steps = step_versions(Version::MAX, 0);
    assert_eq!(steps.next(), Some(Version::MAX));
}
