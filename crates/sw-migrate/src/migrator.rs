//! The transition engine.
//!
//! [`Migrator::migrate_to_version`] opens one transaction, reads the current
//! version, walks every version between it and the target in order, and
//! commits only if every step and every bookkeeping write succeeded. Dropping
//! the transaction on any error rolls back both schema changes and
//! bookkeeping rows, so a failed call leaves the database as it found it.

use crate::bookkeeping::{self, BookkeepingTable, MigrationRecord};
use crate::error::{MigrateError, MigrateResult};
use crate::migration::Migration;
use crate::source::MigrationSource;
use crate::Version;
use duckdb::Connection;
use serde::Serialize;
use std::fmt;

/// Which way a transition moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Unchanged,
}

impl Direction {
    fn between(from: Version, to: Version) -> Self {
        match to.cmp(&from) {
            std::cmp::Ordering::Greater => Direction::Up,
            std::cmp::Ordering::Less => Direction::Down,
            std::cmp::Ordering::Equal => Direction::Unchanged,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
            Direction::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// Outcome of a successful [`Migrator::migrate_to_version`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub from: Version,
    pub to: Version,
    pub direction: Direction,
    /// Versions stepped through, in the order they were applied or reverted.
    pub steps: Vec<Version>,
}

impl Transition {
    /// Whether nothing had to be done.
    pub fn is_noop(&self) -> bool {
        self.steps.is_empty()
    }
}

/// One step of a [`MigrationPlan`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedStep {
    pub version: Version,
    pub name: String,
    pub direction: Direction,
}

/// The steps a transition would take, resolved without running anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationPlan {
    pub from: Version,
    pub to: Version,
    pub direction: Direction,
    pub steps: Vec<PlannedStep>,
}

/// Versions visited moving from `from` to `to`, in visiting order.
///
/// Upgrading visits `from + 1 ..= to`; downgrading visits `to + 1 ..= from`
/// in descending order, since migration N is the one that leaves version N.
/// Yielded lazily: the range may span billions of versions the source lacks.
fn step_versions(from: Version, to: Version) -> Box<dyn Iterator<Item = Version>> {
    match Direction::between(from, to) {
        Direction::Up => Box::new(from + 1..=to),
        Direction::Down => Box::new((to + 1..=from).rev()),
        Direction::Unchanged => Box::new(std::iter::empty()),
    }
}

fn fetch<S: MigrationSource + ?Sized>(
    source: &S,
    version: Version,
) -> MigrateResult<Box<dyn Migration + '_>> {
    source
        .get_migration(version)
        .ok_or(MigrateError::MissingMigration { version })
}

/// Moves a DuckDB database between schema versions.
///
/// Borrows the connection mutably for its lifetime, so only one transition
/// can be in flight per migrator. Separate connections or processes
/// migrating the same database must be serialized by the caller.
pub struct Migrator<'c, S> {
    conn: &'c mut Connection,
    source: S,
    table: BookkeepingTable,
}

impl<'c, S: MigrationSource> Migrator<'c, S> {
    /// Create a migrator recording versions in the default `migrations` table.
    pub fn new(conn: &'c mut Connection, source: S) -> Self {
        Self::with_table(conn, source, BookkeepingTable::default())
    }

    /// Create a migrator recording versions in `table`.
    pub fn with_table(conn: &'c mut Connection, source: S, table: BookkeepingTable) -> Self {
        Self {
            conn,
            source,
            table,
        }
    }

    /// Borrow the underlying DuckDB connection.
    pub fn conn(&self) -> &Connection {
        &*self.conn
    }

    /// The injected migration source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// The bookkeeping table in use.
    pub fn table(&self) -> &BookkeepingTable {
        &self.table
    }

    /// Read the current version, creating the bookkeeping table if needed.
    ///
    /// Table creation and the read share one transaction; on error nothing is
    /// left behind.
    pub fn current_version(&mut self) -> MigrateResult<Version> {
        let tx = self.conn.transaction()?;
        bookkeeping::ensure_table(&tx, &self.table)?;
        let version = bookkeeping::current_version(&tx, &self.table)?;
        tx.commit()?;
        Ok(version)
    }

    /// Applied migrations, ordered by version.
    pub fn applied(&mut self) -> MigrateResult<Vec<MigrationRecord>> {
        let tx = self.conn.transaction()?;
        bookkeeping::ensure_table(&tx, &self.table)?;
        let records = bookkeeping::list_records(&tx, &self.table)?;
        tx.commit()?;
        Ok(records)
    }

    /// Migrate up or down to `target`.
    ///
    /// All steps run in a single transaction. Any failed step, refused
    /// downgrade or version missing from the source rolls the whole
    /// transaction back and the error is returned.
    pub fn migrate_to_version(&mut self, target: Version) -> MigrateResult<Transition> {
        let tx = self.conn.transaction()?;
        bookkeeping::ensure_table(&tx, &self.table)?;
        let current = bookkeeping::current_version(&tx, &self.table)?;
        let direction = Direction::between(current, target);
        let mut steps = Vec::new();

        for version in step_versions(current, target) {
            let migration = fetch(&self.source, version)?;
            let name = migration.name().to_string();
            match direction {
                Direction::Up => {
                    bookkeeping::check_recordable(version)?;
                    log::debug!("Applying migration v{version:03} ({name})");
                    migration.upgrade(&tx)?;
                    bookkeeping::record_upgrade(&tx, &self.table, version, &name)?;
                }
                Direction::Down => {
                    log::debug!("Reverting migration v{version:03} ({name})");
                    migration.downgrade(&tx)?;
                    bookkeeping::record_downgrade(&tx, &self.table, version)?;
                }
                Direction::Unchanged => {}
            }
            steps.push(version);
        }

        tx.commit()?;

        if !steps.is_empty() {
            log::info!(
                "Migrated {} from v{current} to v{target} ({} step(s))",
                self.table,
                steps.len()
            );
        }

        Ok(Transition {
            from: current,
            to: target,
            direction,
            steps,
        })
    }

    /// Resolve the steps [`migrate_to_version`](Self::migrate_to_version) would
    /// take without running any migration.
    ///
    /// Fails with [`MigrateError::MissingMigration`] if the source lacks a
    /// needed version, or [`MigrateError::VersionOutOfRange`] if an upgrade
    /// step could not be recorded. Whether each downgrade is supported is only
    /// known by running it.
    pub fn plan(&mut self, target: Version) -> MigrateResult<MigrationPlan> {
        let from = self.current_version()?;
        let direction = Direction::between(from, target);
        let steps = step_versions(from, target)
            .map(|version| {
                let migration = fetch(&self.source, version)?;
                if direction == Direction::Up {
                    bookkeeping::check_recordable(version)?;
                }
                Ok(PlannedStep {
                    version,
                    name: migration.name().to_string(),
                    direction,
                })
            })
            .collect::<MigrateResult<Vec<_>>>()?;

        Ok(MigrationPlan {
            from,
            to: target,
            direction,
            steps,
        })
    }
}

#[cfg(test)]
#[path = "migrator_test.rs"]
mod tests;
