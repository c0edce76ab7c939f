//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use duckdb::Connection;
use std::path::{Path, PathBuf};
use sw_migrate::{Config, Migrator, SqlDirSource, Transition};

use crate::cli::GlobalArgs;

/// Project configuration with command-line overrides applied.
pub(crate) struct Project {
    /// Project root; relative config paths resolve against it
    pub root: PathBuf,
    pub config: Config,
}

impl Project {
    /// Load the config named by `--config`, or the project directory's
    /// stairwell.yml (defaults if absent), then apply CLI overrides.
    pub fn load(global: &GlobalArgs) -> Result<Self> {
        let root = PathBuf::from(&global.project_dir);
        let mut config = match &global.config {
            Some(path) => {
                Config::load(Path::new(path)).context("Failed to load configuration file")?
            }
            None => Config::load_from_dir_or_default(&root)
                .context("Failed to load project configuration")?,
        };

        if let Some(database) = &global.database {
            config.database.path = database.clone();
        }
        if let Some(dir) = &global.migrations_dir {
            config.migrations_path = dir.clone();
        }

        if global.verbose {
            eprintln!(
                "[verbose] database: {}, migrations: {}, table: {}",
                config.database.path, config.migrations_path, config.table
            );
        }

        Ok(Self { root, config })
    }

    /// Absolute migrations directory.
    pub fn migrations_dir(&self) -> PathBuf {
        self.config.migrations_path_absolute(&self.root)
    }

    /// Load every migration in the migrations directory.
    pub fn load_source(&self) -> Result<SqlDirSource> {
        let dir = self.migrations_dir();
        SqlDirSource::load(&dir)
            .with_context(|| format!("Failed to load migrations from {}", dir.display()))
    }

    /// Open the configured database.
    pub fn open_db(&self) -> Result<Connection> {
        match self.config.database_path_absolute(&self.root) {
            Some(path) => Connection::open(&path)
                .with_context(|| format!("Failed to open database {}", path.display())),
            None => Connection::open_in_memory().context("Failed to open in-memory database"),
        }
    }

    /// Build a migrator over `conn` using the configured bookkeeping table.
    pub fn migrator<'c>(
        &self,
        conn: &'c mut Connection,
        source: &'c SqlDirSource,
    ) -> Migrator<'c, &'c SqlDirSource> {
        Migrator::with_table(conn, source, self.config.table.clone())
    }
}

/// Print the outcome of a migration.
pub(crate) fn print_transition(transition: &Transition) {
    if transition.is_noop() {
        println!("Already at version {}", transition.to);
        return;
    }
    println!(
        "Migrated {} from version {} to {} ({} step(s): {})",
        transition.direction,
        transition.from,
        transition.to,
        transition.steps.len(),
        transition
            .steps
            .iter()
            .map(|v| format!("v{v:03}"))
            .collect::<Vec<_>>()
            .join(", ")
    );
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
