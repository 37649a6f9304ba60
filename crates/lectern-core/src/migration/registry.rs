//! Migration registry for managing linear migration chains.
//!
//! Each version must migrate through all intermediate versions, in ascending
//! order, with no step skipped or reordered.

use super::traits::{TypedMigration, Versioned};
use crate::error::{IntegrityError, Result};
use std::sync::Arc;

/// Registry for managing a linear chain of migrations.
///
/// Migrations are stored in order and must form a continuous chain:
/// 0 → 1 → 2 → ...
#[derive(Debug)]
pub struct MigrationRegistry<T> {
    /// Migrations in order, forming a linear chain.
    migrations: Vec<Arc<dyn TypedMigration<T>>>,
    /// The latest version this registry can migrate to.
    latest_version: u32,
}

impl<T> MigrationRegistry<T> {
    pub fn new(latest_version: u32) -> Self {
        Self {
            migrations: Vec::new(),
            latest_version,
        }
    }

    /// Registers a single migration, validating chain continuity.
    ///
    /// Rejects a step that does not start where the previous one ended, that
    /// does not move forward, or that targets a version past the latest.
    pub fn try_register(&mut self, migration: Arc<dyn TypedMigration<T>>) -> Result<()> {
        if migration.to_version() <= migration.from_version() {
            return Err(IntegrityError::migration(format!(
                "Migration '{}' does not move forward ({} -> {})",
                migration.description(),
                migration.from_version(),
                migration.to_version()
            )));
        }

        if let Some(last) = self.migrations.last() {
            if last.to_version() != migration.from_version() {
                return Err(IntegrityError::migration(format!(
                    "Migration chain broken: expected migration from {} (previous to_version), but got migration from {}. \
                     Description: '{}' (previous) -> '{}' (current)",
                    last.to_version(),
                    migration.from_version(),
                    last.description(),
                    migration.description()
                )));
            }
        }

        if migration.to_version() > self.latest_version {
            return Err(IntegrityError::migration(format!(
                "Migration target version {} exceeds registry's latest version {}",
                migration.to_version(),
                self.latest_version
            )));
        }

        self.migrations.push(migration);
        Ok(())
    }

    /// Registers a migration from a statically known chain.
    ///
    /// # Panics
    ///
    /// Panics if the migration doesn't connect to the existing chain. The
    /// session chain is covered by tests, so this only fires while a new step
    /// is being written.
    pub fn register(&mut self, migration: Arc<dyn TypedMigration<T>>) {
        if let Err(err) = self.try_register(migration) {
            panic!("{err}");
        }
    }

    /// Registers multiple migrations at once, in order.
    pub fn register_all(&mut self, migrations: Vec<Arc<dyn TypedMigration<T>>>) {
        for migration in migrations {
            self.register(migration);
        }
    }

    pub fn latest_version(&self) -> u32 {
        self.latest_version
    }

    /// Returns true if no migrations are registered.
    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }

    /// Returns the number of registered migrations.
    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    /// Whether the chain starts at version 0 and ends at the latest version.
    pub fn is_complete(&self) -> bool {
        match (self.migrations.first(), self.migrations.last()) {
            (Some(first), Some(last)) => {
                first.from_version() == 0 && last.to_version() == self.latest_version
            }
            _ => self.latest_version == 0,
        }
    }

    /// The versions data recorded at `from` will pass through, ending at the
    /// latest version.
    pub fn path_from(&self, from: u32) -> Vec<u32> {
        let mut path = vec![from];
        path.extend(
            self.migrations
                .iter()
                .filter(|m| m.applies_to(from))
                .map(|m| m.to_version()),
        );
        path
    }
}

impl<T: Versioned> MigrationRegistry<T> {
    /// Migrates data to the latest version.
    ///
    /// Every step whose target is above the data's version runs, in
    /// ascending order. The result is always stamped with the latest version;
    /// data recorded by a newer build keeps its fields unchanged.
    pub fn migrate_to_latest(&self, mut data: T) -> T {
        let current_version = data.schema_version();

        if current_version == self.latest_version {
            tracing::debug!(
                "Data is already at the latest version ({}), no migration needed",
                current_version
            );
            return data;
        }

        if current_version > self.latest_version {
            tracing::warn!(
                "Data version ({}) is newer than the latest supported version ({}), keeping fields as-is",
                current_version,
                self.latest_version
            );
            data.stamp_version(self.latest_version);
            return data;
        }

        let pending: Vec<_> = self
            .migrations
            .iter()
            .filter(|m| m.applies_to(current_version))
            .collect();

        tracing::info!(
            "Starting migration from {} to {} ({} steps)",
            current_version,
            self.latest_version,
            pending.len()
        );

        for (i, migration) in pending.iter().enumerate() {
            tracing::debug!(
                "Migration step {}/{}: {} -> {} ({})",
                i + 1,
                pending.len(),
                migration.from_version(),
                migration.to_version(),
                migration.description()
            );
            data = migration.migrate(data);
            data.stamp_version(migration.to_version());
        }

        data.stamp_version(self.latest_version);
        data
    }
}
