//! Schema migration framework for session records.
//!
//! Migrations run as a linear chain over [`SessionDocument`]:
//!
//! ```text
//!   SessionDocument (v0) ──V0→V1──► (v1) ──V1→V2──► ... ──► Session (current)
//! ```
//!
//! # Adding a schema version
//!
//! 1. Bump [`CURRENT_SCHEMA_VERSION`].
//! 2. Make any field the new version introduces optional on `SessionDocument`
//!    and default it in `From<SessionDocument> for Session`.
//! 3. Implement `Migration` + `TypedMigration<SessionDocument>` in
//!    `session.rs`, gated on the new version.
//! 4. Register it in [`build_session_registry`]. The registry rejects a step
//!    that does not continue the chain.

mod document;
mod registry;
mod session;
mod traits;

pub use document::SessionDocument;
pub use registry::MigrationRegistry;
pub use session::{SessionV0ToV1Migration, infer_phase};
pub use traits::{Migration, TypedMigration, Versioned};

use crate::session::{CURRENT_SCHEMA_VERSION, Session};
use std::sync::Arc;

/// Builds the session migration chain, ending at [`CURRENT_SCHEMA_VERSION`].
pub fn build_session_registry() -> MigrationRegistry<SessionDocument> {
    let mut registry = MigrationRegistry::new(CURRENT_SCHEMA_VERSION);
    registry.register_all(vec![Arc::new(SessionV0ToV1Migration)]);
    registry
}

/// Upgrades sessions to the current schema.
#[derive(Debug, Clone)]
pub struct Migrator {
    registry: Arc<MigrationRegistry<SessionDocument>>,
}

impl Default for Migrator {
    fn default() -> Self {
        Self::new(build_session_registry())
    }
}

impl Migrator {
    pub fn new(registry: MigrationRegistry<SessionDocument>) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Migrates a well-typed session.
    ///
    /// A session already at the current version comes back unchanged.
    pub fn migrate(&self, session: Session) -> Session {
        self.migrate_document(SessionDocument::from(session))
    }

    /// Migrates a document of any known version into a current session.
    pub fn migrate_document(&self, document: SessionDocument) -> Session {
        self.registry.migrate_to_latest(document).into()
    }

    pub fn registry(&self) -> &MigrationRegistry<SessionDocument> {
        &self.registry
    }
}
