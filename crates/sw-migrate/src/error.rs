//! Error types for sw-migrate

use crate::Version;
use thiserror::Error;

/// Migration errors
#[derive(Error, Debug)]
pub enum MigrateError {
    /// A migration cannot be reversed (W001)
    #[error("[W001] Downgrade not supported by migration '{name}'")]
    UnsupportedDowngrade { name: String },

    /// The source has no migration for a version the transition needs (W002)
    #[error("[W002] No migration available for version {version}")]
    MissingMigration { version: Version },

    /// DuckDB driver error with preserved source chain (W003)
    #[error("[W003] Database error")]
    Store(#[source] duckdb::Error),

    /// A migration file is malformed or misnamed (W004)
    #[error("[W004] Invalid migration file {path}: {message}")]
    MigrationFile { path: String, message: String },

    /// Two migration files claim the same version (W005)
    #[error("[W005] Duplicate migration for version {version}")]
    DuplicateVersion { version: Version },

    /// Migration versions are not contiguous from 1 (W006)
    #[error("[W006] Migration versions must be contiguous: expected {expected}, found {found}")]
    VersionGap { expected: Version, found: Version },

    /// Filesystem error with the path that failed (W007)
    #[error("[W007] Failed to read '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// Bookkeeping table name is not a plain identifier (W008)
    #[error("[W008] Invalid bookkeeping table name '{name}': {reason}")]
    InvalidTableName { name: String, reason: String },

    /// Configuration file not found (W009)
    #[error("[W009] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// Configuration file could not be parsed (W010)
    #[error("[W010] Failed to parse config: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// Version exceeds what the bookkeeping column can store (W011)
    #[error("[W011] Version {version} exceeds the largest recordable version {max}")]
    VersionOutOfRange { version: Version, max: Version },
}

/// Result type alias for MigrateError
pub type MigrateResult<T> = Result<T, MigrateError>;

impl From<duckdb::Error> for MigrateError {
    fn from(err: duckdb::Error) -> Self {
        MigrateError::Store(err)
    }
}

impl MigrateError {
    /// Build an [`Io`](Self::Io) error for `path`.
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        MigrateError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
