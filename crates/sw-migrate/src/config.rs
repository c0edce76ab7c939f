//! Configuration types and parsing for stairwell.yml

use crate::bookkeeping::BookkeepingTable;
use crate::error::{MigrateError, MigrateResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file names looked up in a project directory, in order.
pub const CONFIG_FILE_NAMES: &[&str] = &["stairwell.yml", "stairwell.yaml"];

/// Path that selects an in-memory DuckDB database.
pub const MEMORY_PATH: &str = ":memory:";

/// Project configuration from stairwell.yml
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Directory containing `NNN_name.up.sql` / `NNN_name.down.sql` files
    #[serde(default = "default_migrations_path")]
    pub migrations_path: String,

    /// Bookkeeping table, optionally schema-qualified
    #[serde(default)]
    pub table: BookkeepingTable,
}

/// Database connection configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// DuckDB file path, or `:memory:`
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            migrations_path: default_migrations_path(),
            table: BookkeepingTable::default(),
        }
    }
}

fn default_db_path() -> String {
    "stairwell.duckdb".to_string()
}

fn default_migrations_path() -> String {
    "migrations".to_string()
}

/// Resolve `path` against `root` unless it is already absolute.
fn resolve(root: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> MigrateResult<Self> {
        if !path.exists() {
            return Err(MigrateError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| MigrateError::io(path, e))?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from a project directory.
    /// Looks for stairwell.yml or stairwell.yaml
    pub fn load_from_dir(dir: &Path) -> MigrateResult<Self> {
        match Self::find_in_dir(dir) {
            Some(path) => Self::load(&path),
            None => Err(MigrateError::ConfigNotFound {
                path: dir.join(CONFIG_FILE_NAMES[0]).display().to_string(),
            }),
        }
    }

    /// Like [`load_from_dir`](Self::load_from_dir), but a directory without a
    /// config file yields the defaults.
    pub fn load_from_dir_or_default(dir: &Path) -> MigrateResult<Self> {
        match Self::find_in_dir(dir) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    fn find_in_dir(dir: &Path) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }

    /// Migrations directory resolved against the project root.
    pub fn migrations_path_absolute(&self, root: &Path) -> PathBuf {
        resolve(root, &self.migrations_path)
    }

    /// Database path resolved against the project root, `None` for `:memory:`.
    pub fn database_path_absolute(&self, root: &Path) -> Option<PathBuf> {
        if self.database.path == MEMORY_PATH {
            None
        } else {
            Some(resolve(root, &self.database.path))
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
