//! Core traits for the migration framework.
//!
//! Schema versions are plain integers. A migration moves data from exactly
//! one version to the next one it names.

use std::fmt::Debug;

/// Data that carries its own schema version.
pub trait Versioned {
    fn schema_version(&self) -> u32;

    /// Overwrites the recorded schema version.
    fn stamp_version(&mut self, version: u32);
}

/// Base trait for all migrations.
///
/// Provides version information and metadata about a migration step.
pub trait Migration: Send + Sync {
    /// Returns the source version this migration starts from.
    fn from_version(&self) -> u32;

    /// Returns the target version this migration produces.
    fn to_version(&self) -> u32;

    /// Whether data recorded at `version` still needs this step.
    fn applies_to(&self, version: u32) -> bool {
        version < self.to_version()
    }

    /// Returns a human-readable description of this migration.
    ///
    /// Used for logging and debugging purposes.
    fn description(&self) -> &str;
}

/// A migration that transforms data in place of one schema shape.
///
/// Steps are infallible: a migration may only add or infer information, and
/// any data it cannot interpret is left untouched.
pub trait TypedMigration<T>: Migration + Debug {
    fn migrate(&self, data: T) -> T;
}
