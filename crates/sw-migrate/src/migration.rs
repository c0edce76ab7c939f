//! The migration unit contract and its plain-SQL implementation.

use crate::error::{MigrateError, MigrateResult};
use duckdb::Transaction;

/// A single reversible schema change.
///
/// A migration is identified by the version it moves the database *into*:
/// the migration for version N upgrades N-1 to N and downgrades N to N-1.
///
/// Both actions run against the transaction owned by the
/// [`Migrator`](crate::Migrator). Implementations issue statements on `tx`
/// only; they never begin, commit, or roll back a transaction themselves.
pub trait Migration {
    /// Human-readable name, recorded in the bookkeeping table on upgrade.
    fn name(&self) -> &str;

    /// Apply this migration.
    fn upgrade(&self, tx: &Transaction<'_>) -> MigrateResult<()>;

    /// Undo this migration.
    ///
    /// Migrations that cannot be reversed return
    /// [`MigrateError::UnsupportedDowngrade`] rather than doing nothing.
    fn downgrade(&self, tx: &Transaction<'_>) -> MigrateResult<()>;
}

impl<M: Migration + ?Sized> Migration for &M {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn upgrade(&self, tx: &Transaction<'_>) -> MigrateResult<()> {
        (**self).upgrade(tx)
    }

    fn downgrade(&self, tx: &Transaction<'_>) -> MigrateResult<()> {
        (**self).downgrade(tx)
    }
}

impl<M: Migration + ?Sized> Migration for Box<M> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn upgrade(&self, tx: &Transaction<'_>) -> MigrateResult<()> {
        (**self).upgrade(tx)
    }

    fn downgrade(&self, tx: &Transaction<'_>) -> MigrateResult<()> {
        (**self).downgrade(tx)
    }
}

/// A migration that runs one SQL batch on upgrade and, optionally, another on
/// downgrade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleMigration {
    name: String,
    up: String,
    down: Option<String>,
}

impl SimpleMigration {
    /// Create an irreversible migration. Add a downgrade with
    /// [`with_down`](Self::with_down).
    pub fn new(name: impl Into<String>, up: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            up: up.into(),
            down: None,
        }
    }

    /// Create a migration with both directions.
    pub fn reversible(
        name: impl Into<String>,
        up: impl Into<String>,
        down: impl Into<String>,
    ) -> Self {
        Self::new(name, up).with_down(down)
    }

    /// Set the downgrade SQL.
    pub fn with_down(mut self, down: impl Into<String>) -> Self {
        self.down = Some(down.into());
        self
    }

    /// The upgrade SQL batch.
    pub fn up_sql(&self) -> &str {
        &self.up
    }

    /// The downgrade SQL batch, if this migration is reversible.
    pub fn down_sql(&self) -> Option<&str> {
        self.down.as_deref()
    }

    /// Whether [`downgrade`](Migration::downgrade) is supported.
    pub fn is_reversible(&self) -> bool {
        self.down.is_some()
    }
}

impl Migration for SimpleMigration {
    fn name(&self) -> &str {
        &self.name
    }

    fn upgrade(&self, tx: &Transaction<'_>) -> MigrateResult<()> {
        tx.execute_batch(&self.up)?;
        Ok(())
    }

    fn downgrade(&self, tx: &Transaction<'_>) -> MigrateResult<()> {
        let Some(down) = &self.down else {
            return Err(MigrateError::UnsupportedDowngrade {
                name: self.name.clone(),
            });
        };
        tx.execute_batch(down)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "migration_test.rs"]
mod tests;
