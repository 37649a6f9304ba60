//! The session integrity subsystem.
//!
//! Untrusted data flows through four stateless components:
//!
//! ```text
//! text ─► Value ─► Validator ─┬─ valid ──────► SessionDocument ─┐
//!                             └─ repairable ─► Recoverer ───────┴─► Migrator ─► Session
//! ```
//!
//! [`SessionIntegrity`] owns the injected capabilities (identifier source and
//! clock) and exposes every operation. The free functions at the bottom of
//! this module use a default instance backed by UUIDs and the system clock.

pub mod backup;
pub mod decode;
pub mod recoverer;
pub mod validator;

pub use backup::{BackupEnvelope, BackupInfo};
pub use recoverer::{RECOVERED_SESSION_NAME, Recoverer};
pub use validator::{ValidationReport, Validator};

use crate::error::{IntegrityError, Result};
use crate::identity::{Clock, IdGenerator, SystemClock, UuidGenerator};
use crate::migration::{MigrationRegistry, Migrator, SessionDocument, build_session_registry};
use crate::session::Session;
use serde_json::Value;
use std::sync::Arc;

/// A session that is safe to use, plus how it got that way.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSession {
    pub session: Session,
    pub report: ValidationReport,
    /// Whether any field was defaulted or any entry dropped.
    pub repaired: bool,
}

/// Facade over the validator, recoverer, migrator and backup codec.
///
/// Cheap to clone and safe to share across threads.
#[derive(Clone)]
pub struct SessionIntegrity {
    recoverer: Recoverer,
    validator: Validator,
    migrator: Migrator,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for SessionIntegrity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionIntegrity")
            .field("recoverer", &self.recoverer)
            .field("migrator", &self.migrator)
            .field("clock", &"<dyn Clock>")
            .finish()
    }
}

impl Default for SessionIntegrity {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl SessionIntegrity {
    pub fn builder() -> SessionIntegrityBuilder {
        SessionIntegrityBuilder::default()
    }

    /// Classifies an untrusted value, recovering it when it is repairable.
    pub fn validate(&self, value: &Value) -> ValidationReport {
        self.validator.validate(value)
    }

    /// Rebuilds a well-typed session from any value.
    pub fn recover(&self, value: &Value) -> Session {
        self.recoverer.recover(value)
    }

    /// Upgrades a session to the current schema.
    pub fn migrate(&self, session: Session) -> Session {
        self.migrator.migrate(session)
    }

    pub fn migrate_document(&self, document: SessionDocument) -> Session {
        self.migrator.migrate_document(document)
    }

    /// Wraps a session in a backup envelope stamped with the current time.
    pub fn create_backup(&self, session: &Session) -> Result<String> {
        backup::encode(session, self.clock.now_millis())
    }

    /// Returns the session inside a backup envelope, or `None` when `text`
    /// is not a backup.
    ///
    /// An embedded session from an older schema is migrated; a damaged one
    /// is recovered rather than discarded.
    pub fn restore_from_backup(&self, text: &str) -> Option<Session> {
        let mut envelope = backup::open(text)?;
        let embedded = envelope.remove("session")?;

        match self.decode_intact(&embedded) {
            Ok(session) => Some(session),
            Err(defects) => {
                tracing::warn!(defects = defects.len(), "Backup holds a damaged session, recovering it");
                Some(self.recoverer.recover(&embedded))
            }
        }
    }

    /// Runs the full load pipeline on a decoded value.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrityError::Unrecoverable`] if the value is not a record.
    pub fn load_value(&self, value: Value) -> Result<LoadedSession> {
        let mut report = self.validator.validate(&value);

        if report.is_unrecoverable() {
            return Err(IntegrityError::unrecoverable(report.errors));
        }

        let (session, repaired) = match report.recovered.clone() {
            Some(recovered) => (self.migrator.migrate(recovered), true),
            None => match self.decode_intact(&value) {
                Ok(session) => (session, false),
                Err(defects) => {
                    // The validator only probes the top level; a deeper defect
                    // still needs the recoverer.
                    tracing::info!(
                        defects = defects.len(),
                        "Session passed validation but is not intact, recovering"
                    );
                    report.warnings.extend(defects);
                    let recovered = self.recoverer.recover(&value);
                    report.recovered = Some(recovered.clone());
                    (self.migrator.migrate(recovered), true)
                }
            },
        };

        Ok(LoadedSession {
            session,
            report,
            repaired,
        })
    }

    /// Strictly decodes and migrates a value, accepting it only if every
    /// entity also satisfies [`Session::defects`].
    fn decode_intact(&self, value: &Value) -> std::result::Result<Session, Vec<String>> {
        let document = SessionDocument::from_value(value.clone())
            .map_err(|err| vec![format!("Session could not be decoded as-is: {err}")])?;
        let session = self.migrator.migrate_document(document);

        let defects = session.defects();
        if defects.is_empty() {
            Ok(session)
        } else {
            Err(defects)
        }
    }

    /// Parses text and runs the full load pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrityError::Parse`] for malformed JSON and
    /// [`IntegrityError::Unrecoverable`] if it does not hold a record.
    pub fn load_str(&self, text: &str) -> Result<LoadedSession> {
        let value: Value =
            serde_json::from_str(text).map_err(|err| IntegrityError::parse(err.to_string()))?;
        self.load_value(value)
    }
}

/// Builder for [`SessionIntegrity`], used to inject deterministic
/// capabilities in tests.
#[derive(Default)]
pub struct SessionIntegrityBuilder {
    ids: Option<Arc<dyn IdGenerator>>,
    clock: Option<Arc<dyn Clock>>,
    registry: Option<MigrationRegistry<SessionDocument>>,
}

impl SessionIntegrityBuilder {
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn with_registry(mut self, registry: MigrationRegistry<SessionDocument>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn build(self) -> SessionIntegrity {
        let ids = self.ids.unwrap_or_else(|| Arc::new(UuidGenerator));
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let registry = self.registry.unwrap_or_else(build_session_registry);

        let recoverer = Recoverer::new(ids, Arc::clone(&clock));
        SessionIntegrity {
            validator: Validator::new(recoverer.clone()),
            recoverer,
            migrator: Migrator::new(registry),
            clock,
        }
    }
}

impl std::fmt::Debug for SessionIntegrityBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionIntegrityBuilder")
            .field("ids", &self.ids.as_ref().map(|_| "<dyn IdGenerator>"))
            .field("clock", &self.clock.as_ref().map(|_| "<dyn Clock>"))
            .field("registry", &self.registry)
            .finish()
    }
}

// ============================================================================
// Default-capability entry points
// ============================================================================

/// Validates with UUID identifiers and the system clock.
pub fn validate_session(value: &Value) -> ValidationReport {
    SessionIntegrity::default().validate(value)
}

pub fn recover_session(value: &Value) -> Session {
    SessionIntegrity::default().recover(value)
}

pub fn migrate_session(session: Session) -> Session {
    SessionIntegrity::default().migrate(session)
}

pub fn create_backup(session: &Session) -> Result<String> {
    SessionIntegrity::default().create_backup(session)
}

pub fn restore_from_backup(text: &str) -> Option<Session> {
    SessionIntegrity::default().restore_from_backup(text)
}

pub fn inspect_backup(text: &str) -> Option<BackupInfo> {
    backup::inspect(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{FixedClock, SequentialIdGenerator};
    use crate::session::SessionPhase;
    use serde_json::json;

    fn integrity() -> SessionIntegrity {
        SessionIntegrity::builder()
            .with_id_generator(Arc::new(SequentialIdGenerator::new("gen")))
            .with_clock(Arc::new(FixedClock(1_700_000_000_000)))
            .build()
    }

    #[test]
    fn test_load_rejects_non_records() {
        let err = integrity().load_value(json!(null)).unwrap_err();
        assert!(err.is_unrecoverable());
    }

    #[test]
    fn test_load_str_rejects_malformed_json() {
        let err = integrity().load_str("{\"id\":").unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn test_load_migrates_clean_v0_documents() {
        let loaded = integrity()
            .load_value(json!({
                "id": "s1",
                "name": "Old",
                "slides": [],
                "notes": {},
                "transcripts": {"s-1": []},
                "aiConversations": [],
                "currentSlideIndex": 0,
                "isRecording": false,
                "createdAt": 1,
                "updatedAt": 2
            }))
            .unwrap();

        assert!(!loaded.repaired);
        assert!(loaded.report.valid);
        assert_eq!(loaded.session.phase, SessionPhase::ReadyToEnhance);
        assert_eq!(loaded.session.schema_version, 1);
    }

    #[test]
    fn test_load_recovers_deep_defects() {
        // Top level is clean, but a note is missing its timestamps.
        let loaded = integrity()
            .load_value(json!({
                "id": "s1",
                "name": "Deep",
                "slides": [],
                "notes": {"s-1": {"id": "n1", "content": "x"}},
                "transcripts": {},
                "aiConversations": [],
                "currentSlideIndex": 0,
                "isRecording": false,
                "phase": "idle",
                "createdAt": 1,
                "updatedAt": 2,
                "schemaVersion": 1
            }))
            .unwrap();

        assert!(loaded.repaired);
        assert_eq!(loaded.report.warnings.len(), 1);
        assert!(loaded.report.recovered.is_some());
        let note = &loaded.session.notes["s-1"];
        assert_eq!(note.slide_id, "s-1");
        assert_eq!(note.created_at, 1_700_000_000_000);
    }

    #[test]
    fn test_load_repairs_reported_defects() {
        let loaded = integrity().load_value(json!({"slides": [{}]})).unwrap();
        assert!(loaded.repaired);
        assert!(!loaded.report.valid);
        assert_eq!(loaded.session.id, "gen-1");
        assert_eq!(loaded.session.slides[0].id, "slide-0");
    }

    #[test]
    fn test_restore_recovers_damaged_embedded_session() {
        let text = r#"{"backup":true,"timestamp":"t","session":{"id":"s1","slides":"bad"}}"#;
        let session = integrity().restore_from_backup(text).unwrap();
        assert_eq!(session.id, "s1");
        assert!(session.slides.is_empty());
    }

    #[test]
    fn test_restore_migrates_old_embedded_session() {
        let text = json!({
            "backup": true,
            "timestamp": "2024-01-01T00:00:00.000Z",
            "session": {
                "id": "s1",
                "name": "Old",
                "slides": [],
                "notes": {},
                "transcripts": {},
                "aiConversations": [],
                "currentSlideIndex": 0,
                "isRecording": true,
                "createdAt": 1,
                "updatedAt": 2
            }
        })
        .to_string();

        let session = integrity().restore_from_backup(&text).unwrap();
        assert_eq!(session.phase, SessionPhase::Recording);
        assert_eq!(session.schema_version, 1);
    }

    #[test]
    fn test_backup_timestamp_uses_injected_clock() {
        let session = Session::new("s1", "Deck", 0);
        let text = integrity().create_backup(&session).unwrap();
        let info = inspect_backup(&text).unwrap();
        assert_eq!(info.timestamp.as_deref(), Some("2023-11-14T22:13:20.000Z"));
        assert_eq!(info.session_id.as_deref(), Some("s1"));
    }
}
