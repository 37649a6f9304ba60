//! Session integrity for Lectern.
//!
//! A Lectern session (imported slides, notes, transcripts, enhanced notes and
//! AI chat history) is persisted as one versioned JSON record. This crate
//! turns an untrusted record into a schema-current [`Session`]: it validates,
//! repairs what it can, migrates old schemas, and wraps sessions in backup
//! envelopes. It performs no I/O.
//!
//! ```
//! use lectern_core::SessionIntegrity;
//!
//! let integrity = SessionIntegrity::default();
//! let loaded = integrity
//!     .load_str(r#"{"id": "s1", "slides": [{"imageData": "data:image/png;base64,"}]}"#)
//!     .unwrap();
//!
//! assert!(loaded.repaired);
//! assert_eq!(loaded.session.slides[0].id, "slide-0");
//! ```

pub mod error;
pub mod identity;
pub mod integrity;
pub mod migration;
pub mod session;

pub use error::{IntegrityError, Result};
pub use identity::{Clock, FixedClock, IdGenerator, SequentialIdGenerator, SystemClock, UuidGenerator};
pub use integrity::{
    BackupEnvelope, BackupInfo, LoadedSession, SessionIntegrity, SessionIntegrityBuilder,
    ValidationReport, create_backup, inspect_backup, migrate_session, recover_session,
    restore_from_backup, validate_session,
};
pub use migration::{Migrator, SessionDocument};
pub use session::{CURRENT_SCHEMA_VERSION, Session, SessionPhase};
