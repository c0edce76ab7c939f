//! Lookup of migrations by version.

use crate::migration::Migration;
use crate::Version;

/// Supplies the migration responsible for a given version.
///
/// The [`Migrator`](crate::Migrator) calls [`get_migration`](Self::get_migration)
/// once per version it visits, in visiting order. Returning `None` for a
/// version the transition needs aborts the whole transition.
pub trait MigrationSource {
    /// The migration that moves the database into `version`, if any.
    fn get_migration(&self, version: Version) -> Option<Box<dyn Migration + '_>>;
}

impl<S: MigrationSource + ?Sized> MigrationSource for &S {
    fn get_migration(&self, version: Version) -> Option<Box<dyn Migration + '_>> {
        (**self).get_migration(version)
    }
}

impl<S: MigrationSource + ?Sized> MigrationSource for Box<S> {
    fn get_migration(&self, version: Version) -> Option<Box<dyn Migration + '_>> {
        (**self).get_migration(version)
    }
}

/// A slice holds version N at index N-1.
impl<M: Migration> MigrationSource for [M] {
    fn get_migration(&self, version: Version) -> Option<Box<dyn Migration + '_>> {
        let index = usize::try_from(version).ok()?.checked_sub(1)?;
        self.get(index)
            .map(|migration| Box::new(migration) as Box<dyn Migration + '_>)
    }
}

/// An ordered list of heterogeneous migrations.
///
/// The first migration pushed is version 1, the second version 2, and so on,
/// so the list can never contain a gap.
#[derive(Default)]
pub struct MigrationList {
    migrations: Vec<Box<dyn Migration>>,
}

impl MigrationList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a migration as the next version.
    pub fn push(&mut self, migration: impl Migration + 'static) {
        self.migrations.push(Box::new(migration));
    }

    /// Builder form of [`push`](Self::push).
    pub fn with(mut self, migration: impl Migration + 'static) -> Self {
        self.push(migration);
        self
    }

    /// Number of migrations.
    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }

    /// The highest version this list can migrate to, 0 when empty.
    pub fn latest_version(&self) -> Version {
        Version::try_from(self.migrations.len()).unwrap_or(Version::MAX)
    }
}

impl MigrationSource for MigrationList {
    fn get_migration(&self, version: Version) -> Option<Box<dyn Migration + '_>> {
        self.migrations.as_slice().get_migration(version)
    }
}

impl std::fmt::Debug for MigrationList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.migrations.iter().map(|m| m.name()))
            .finish()
    }
}

/// A source backed by a closure. Built with [`from_fn`].
pub struct FnSource<F> {
    lookup: F,
}

/// Create a [`MigrationSource`] from a closure that builds the migration for
/// each version on demand.
///
/// ```
/// use sw_migrate::{from_fn, Migration, SimpleMigration};
///
/// let source = from_fn(|version| {
///     (version <= 3).then(|| {
///         Box::new(SimpleMigration::reversible("noop", "SELECT 1", "SELECT 1"))
///             as Box<dyn Migration>
///     })
/// });
/// # let _ = source;
/// ```
pub fn from_fn<F>(lookup: F) -> FnSource<F>
where
    F: Fn(Version) -> Option<Box<dyn Migration>>,
{
    FnSource { lookup }
}

impl<F> MigrationSource for FnSource<F>
where
    F: Fn(Version) -> Option<Box<dyn Migration>>,
{
    fn get_migration(&self, version: Version) -> Option<Box<dyn Migration + '_>> {
        (self.lookup)(version).map(|migration| migration as Box<dyn Migration + '_>)
    }
}

#[cfg(test)]
#[path = "source_test.rs"]
mod tests;
