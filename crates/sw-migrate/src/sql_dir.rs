//! Migrations loaded from a directory of SQL files.
//!
//! File layout:
//!
//! ```text
//! migrations/
//!   001_initial.up.sql
//!   002_create_images.up.sql
//!   002_create_images.down.sql
//! ```
//!
//! The numeric prefix is the version, the rest of the stem is the name. A
//! missing `.down.sql` makes that version irreversible. Files with other
//! extensions are ignored.

use crate::error::{MigrateError, MigrateResult};
use crate::migration::{Migration, SimpleMigration};
use crate::source::MigrationSource;
use crate::Version;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const UP_SUFFIX: &str = ".up.sql";
const DOWN_SUFFIX: &str = ".down.sql";

/// File names for the up and down scripts of `version`.
pub fn migration_file_names(version: Version, name: &str) -> (String, String) {
    (
        format!("{version:03}_{name}{UP_SUFFIX}"),
        format!("{version:03}_{name}{DOWN_SUFFIX}"),
    )
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Script {
    Up,
    Down,
}

/// Split `NNN_name.up.sql` into its version, name, and direction.
///
/// Returns `Ok(None)` for files that are not migration scripts.
fn parse_file_name(path: &Path) -> MigrateResult<Option<(Version, String, Script)>> {
    let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
        return Ok(None);
    };
    let (stem, script) = if let Some(stem) = file_name.strip_suffix(UP_SUFFIX) {
        (stem, Script::Up)
    } else if let Some(stem) = file_name.strip_suffix(DOWN_SUFFIX) {
        (stem, Script::Down)
    } else {
        return Ok(None);
    };

    let invalid = |message: &str| MigrateError::MigrationFile {
        path: path.display().to_string(),
        message: message.to_string(),
    };

    let (prefix, name) = stem
        .split_once('_')
        .ok_or_else(|| invalid("expected NNN_name"))?;
    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("version prefix must be numeric"));
    }
    if name.is_empty() {
        return Err(invalid("migration name must not be empty"));
    }
    let version: Version = prefix
        .parse()
        .map_err(|_| invalid("version prefix out of range"))?;
    if version == 0 {
        return Err(invalid("version 0 is reserved for the empty schema"));
    }

    Ok(Some((version, name.to_string(), script)))
}

fn read_script(path: &Path) -> MigrateResult<String> {
    std::fs::read_to_string(path).map_err(|e| MigrateError::io(path, e))
}

#[derive(Default)]
struct Pending {
    name: String,
    up: Option<String>,
    down: Option<(PathBuf, String)>,
}

/// A [`MigrationSource`] over the `.sql` files of one directory.
#[derive(Debug, Clone, Default)]
pub struct SqlDirSource {
    migrations: Vec<SimpleMigration>,
}

impl SqlDirSource {
    /// Load every migration in `dir`.
    ///
    /// Fails on malformed file names, duplicate versions, a down script
    /// without an up script, and any gap in the version sequence.
    pub fn load(dir: &Path) -> MigrateResult<Self> {
        let entries = std::fs::read_dir(dir).map_err(|e| MigrateError::io(dir, e))?;

        let mut pending: BTreeMap<Version, Pending> = BTreeMap::new();
        for entry in entries {
            let path = entry.map_err(|e| MigrateError::io(dir, e))?.path();
            if !path.is_file() {
                continue;
            }
            let Some((version, name, script)) = parse_file_name(&path)? else {
                continue;
            };

            let slot = pending.entry(version).or_insert_with(|| Pending {
                name: name.clone(),
                ..Pending::default()
            });
            if slot.name != name {
                return Err(MigrateError::DuplicateVersion { version });
            }
            let sql = read_script(&path)?;
            match script {
                Script::Up if slot.up.is_none() => slot.up = Some(sql),
                Script::Down if slot.down.is_none() => slot.down = Some((path, sql)),
                _ => return Err(MigrateError::DuplicateVersion { version }),
            }
        }

        let mut migrations = Vec::with_capacity(pending.len());
        for (expected, (version, slot)) in (1..).zip(pending) {
            if version != expected {
                return Err(MigrateError::VersionGap {
                    expected,
                    found: version,
                });
            }
            let Some(up) = slot.up else {
                let path = slot.down.map(|(p, _)| p).unwrap_or_default();
                return Err(MigrateError::MigrationFile {
                    path: path.display().to_string(),
                    message: "down script has no matching .up.sql".to_string(),
                });
            };
            let mut migration = SimpleMigration::new(slot.name, up);
            if let Some((_, down)) = slot.down {
                migration = migration.with_down(down);
            }
            migrations.push(migration);
        }

        log::debug!("Loaded {} migration(s) from {}", migrations.len(), dir.display());
        Ok(Self { migrations })
    }

    /// Migrations in version order; index 0 is version 1.
    pub fn migrations(&self) -> &[SimpleMigration] {
        &self.migrations
    }

    /// Number of migrations.
    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    /// Whether the directory held no migrations.
    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }

    /// The highest version available, 0 when empty.
    pub fn latest_version(&self) -> Version {
        Version::try_from(self.migrations.len()).unwrap_or(Version::MAX)
    }
}

impl MigrationSource for SqlDirSource {
    fn get_migration(&self, version: Version) -> Option<Box<dyn Migration + '_>> {
        self.migrations.as_slice().get_migration(version)
    }
}

#[cfg(test)]
#[path = "sql_dir_test.rs"]
mod tests;
