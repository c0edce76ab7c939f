//! The bookkeeping table recording which versions are applied.
//!
//! One row per applied version. The current version is the highest recorded
//! version, or 0 when the table is empty. Rows are only ever written by the
//! [`Migrator`](crate::Migrator): inserted when a version is upgraded through
//! and deleted when it is downgraded through.

use crate::error::{MigrateError, MigrateResult};
use crate::Version;
use duckdb::Connection;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default bookkeeping table name.
pub const DEFAULT_TABLE: &str = "migrations";

/// Validated name of the bookkeeping table, optionally schema-qualified.
///
/// Each part must be a plain identifier (ASCII letters, digits and `_`, not
/// starting with a digit) since the name is spliced into DDL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BookkeepingTable {
    schema: Option<String>,
    name: String,
}

impl BookkeepingTable {
    /// Parse `table` or `schema.table`.
    pub fn new(qualified: &str) -> MigrateResult<Self> {
        let invalid = |reason: &str| MigrateError::InvalidTableName {
            name: qualified.to_string(),
            reason: reason.to_string(),
        };

        let parts: Vec<&str> = qualified.split('.').collect();
        let (schema, name) = match parts.as_slice() {
            [name] => (None, *name),
            [schema, name] => (Some(*schema), *name),
            _ => return Err(invalid("expected 'table' or 'schema.table'")),
        };

        for part in schema.iter().chain(std::iter::once(&name)) {
            check_identifier(part).map_err(invalid)?;
        }

        Ok(Self {
            schema: schema.map(str::to_string),
            name: name.to_string(),
        })
    }

    /// Schema part, if qualified.
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// Unqualified table name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

fn check_identifier(ident: &str) -> Result<(), &'static str> {
    let mut chars = ident.chars();
    match chars.next() {
        None => return Err("identifier must not be empty"),
        Some(c) if !(c.is_ascii_alphabetic() || c == '_') => {
            return Err("identifier must start with a letter or underscore")
        }
        Some(_) => {}
    }
    if chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err("identifier may only contain letters, digits and underscores")
    }
}

impl Default for BookkeepingTable {
    fn default() -> Self {
        Self {
            schema: None,
            name: DEFAULT_TABLE.to_string(),
        }
    }
}

impl fmt::Display for BookkeepingTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{schema}.{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

impl TryFrom<String> for BookkeepingTable {
    type Error = MigrateError;

    fn try_from(value: String) -> MigrateResult<Self> {
        Self::new(&value)
    }
}

impl From<BookkeepingTable> for String {
    fn from(table: BookkeepingTable) -> Self {
        table.to_string()
    }
}

/// One applied version as persisted in the bookkeeping table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationRecord {
    /// Version the migration moved the database into.
    pub version: Version,
    /// Migration name at the time it was applied.
    pub name: String,
    /// Application timestamp as rendered by DuckDB (`TIMESTAMPTZ` text).
    pub date_ran: String,
}

/// Largest version the `INTEGER` version column can hold.
pub const MAX_RECORDED_VERSION: Version = i32::MAX as Version;

/// Fail with [`MigrateError::VersionOutOfRange`] if `version` cannot be stored.
pub(crate) fn check_recordable(version: Version) -> MigrateResult<()> {
    if version > MAX_RECORDED_VERSION {
        return Err(MigrateError::VersionOutOfRange {
            version,
            max: MAX_RECORDED_VERSION,
        });
    }
    Ok(())
}

/// Create the bookkeeping table (and its schema) if absent.
pub(crate) fn ensure_table(conn: &Connection, table: &BookkeepingTable) -> MigrateResult<()> {
    if let Some(schema) = table.schema() {
        conn.execute_batch(&format!("CREATE SCHEMA IF NOT EXISTS {schema}"))?;
    }
    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {table} (
             version  INTEGER NOT NULL UNIQUE,
             name     TEXT NOT NULL,
             date_ran TIMESTAMP WITH TIME ZONE NOT NULL
         )"
    ))?;
    Ok(())
}

/// Highest recorded version, or 0 if none.
pub(crate) fn current_version(conn: &Connection, table: &BookkeepingTable) -> MigrateResult<Version> {
    let version: Version = conn.query_row(
        &format!("SELECT COALESCE(MAX(version), 0) FROM {table}"),
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Record that `version` was upgraded through.
pub(crate) fn record_upgrade(
    conn: &Connection,
    table: &BookkeepingTable,
    version: Version,
    name: &str,
) -> MigrateResult<()> {
    conn.execute(
        &format!("INSERT INTO {table} (version, name, date_ran) VALUES (?, ?, now())"),
        duckdb::params![version, name],
    )?;
    Ok(())
}

/// Remove the record for `version` after it was downgraded through.
pub(crate) fn record_downgrade(
    conn: &Connection,
    table: &BookkeepingTable,
    version: Version,
) -> MigrateResult<()> {
    conn.execute(
        &format!("DELETE FROM {table} WHERE version = ?"),
        duckdb::params![version],
    )?;
    Ok(())
}

/// All records, ordered by version.
pub(crate) fn list_records(
    conn: &Connection,
    table: &BookkeepingTable,
) -> MigrateResult<Vec<MigrationRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT version, name, CAST(date_ran AS VARCHAR) FROM {table} ORDER BY version"
    ))?;
    let records = stmt
        .query_map([], |row| {
            Ok(MigrationRecord {
                version: row.get(0)?,
                name: row.get(1)?,
                date_ran: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(records)
}

#[cfg(test)]
#[path = "bookkeeping_test.rs"]
mod tests;
