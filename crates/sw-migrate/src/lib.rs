//! sw-migrate - Versioned, reversible schema migrations for DuckDB
//!
//! A [`Migrator`] reads the version recorded in a bookkeeping table, asks a
//! [`MigrationSource`] for every migration between that version and the
//! requested one, and applies them in order inside a single transaction.
//! Either every step lands or none do.

pub mod bookkeeping;
pub mod config;
pub mod error;
pub mod migration;
pub mod migrator;
pub mod source;
pub mod sql_dir;

pub use bookkeeping::{BookkeepingTable, MigrationRecord};
pub use config::Config;
pub use error::{MigrateError, MigrateResult};
pub use migration::{Migration, SimpleMigration};
pub use migrator::{Direction, MigrationPlan, Migrator, PlannedStep, Transition};
pub use source::{from_fn, FnSource, MigrationList, MigrationSource};
pub use sql_dir::SqlDirSource;

/// A schema version. `0` is the clean slate with no migrations applied.
///
/// Only versions up to [`bookkeeping::MAX_RECORDED_VERSION`] can be applied,
/// since the bookkeeping column is a 32-bit signed `INTEGER`.
pub type Version = u32;
