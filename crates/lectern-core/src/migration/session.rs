//! Session entity migrations.
//!
//! Each migration handles a single version transition of
//! [`SessionDocument`]. Migrations only fill in what is absent; values that
//! are already present are never overwritten.

use super::document::SessionDocument;
use super::traits::{Migration, TypedMigration};
use crate::session::SessionPhase;

/// Migration from schema 0 to schema 1.
///
/// Changes:
/// - Add `enhancedNotes` (empty)
/// - Add `phase`, inferred from the recording state and existing content
/// - Add `totalRecordingDuration` (0)
#[derive(Debug, Default)]
pub struct SessionV0ToV1Migration;

impl Migration for SessionV0ToV1Migration {
    fn from_version(&self) -> u32 {
        0
    }

    fn to_version(&self) -> u32 {
        1
    }

    fn description(&self) -> &str {
        "Add 'enhancedNotes', infer 'phase', add 'totalRecordingDuration'"
    }
}

impl TypedMigration<SessionDocument> for SessionV0ToV1Migration {
    fn migrate(&self, mut document: SessionDocument) -> SessionDocument {
        let enhanced_notes = document.enhanced_notes.get_or_insert_with(Default::default);

        if document.phase.is_none() {
            let phase = infer_phase(
                document.is_recording,
                !enhanced_notes.is_empty(),
                !document.transcripts.is_empty(),
            );
            tracing::debug!(session_id = %document.id, %phase, "Inferred session phase");
            document.phase = Some(phase);
        }

        document.total_recording_duration.get_or_insert(0);
        document
    }
}

/// Infers the workflow phase of a session that never recorded one.
///
/// Precedence: an active recording wins, then enhanced notes, then
/// transcripts.
pub fn infer_phase(
    is_recording: bool,
    has_enhanced_notes: bool,
    has_transcripts: bool,
) -> SessionPhase {
    if is_recording {
        SessionPhase::Recording
    } else if has_enhanced_notes {
        SessionPhase::Enhanced
    } else if has_transcripts {
        SessionPhase::ReadyToEnhance
    } else {
        SessionPhase::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{EnhancedNote, EnhancementStatus, Session, TranscriptSegment};

    fn v0_document() -> SessionDocument {
        let mut document = SessionDocument::from(Session::new("s1", "Old", 0));
        document.schema_version = 0;
        document.enhanced_notes = None;
        document.phase = None;
        document.total_recording_duration = None;
        document
    }

    fn enhanced(slide_id: &str) -> EnhancedNote {
        EnhancedNote {
            id: "e1".to_string(),
            slide_id: slide_id.to_string(),
            content: "better".to_string(),
            plain_text: "better".to_string(),
            status: EnhancementStatus::Complete,
            error: None,
            enhanced_at: 0,
        }
    }

    fn segment(slide_id: &str) -> TranscriptSegment {
        TranscriptSegment {
            id: "t1".to_string(),
            slide_id: slide_id.to_string(),
            text: "hello".to_string(),
            start_time: 0.0,
            end_time: 500.0,
            confidence: 0.9,
        }
    }

    #[test]
    fn test_phase_precedence() {
        assert_eq!(infer_phase(true, true, true), SessionPhase::Recording);
        assert_eq!(infer_phase(false, true, true), SessionPhase::Enhanced);
        assert_eq!(infer_phase(false, false, true), SessionPhase::ReadyToEnhance);
        assert_eq!(infer_phase(false, false, false), SessionPhase::Idle);
    }

    #[test]
    fn test_fills_absent_fields() {
        let migrated = SessionV0ToV1Migration.migrate(v0_document());
        assert_eq!(migrated.enhanced_notes, Some(Default::default()));
        assert_eq!(migrated.phase, Some(SessionPhase::Idle));
        assert_eq!(migrated.total_recording_duration, Some(0));
    }

    #[test]
    fn test_recording_session_becomes_recording() {
        let mut document = v0_document();
        document.is_recording = true;
        document.transcripts.insert("s-1".to_string(), vec![segment("s-1")]);

        let migrated = SessionV0ToV1Migration.migrate(document);
        assert_eq!(migrated.phase, Some(SessionPhase::Recording));
    }

    #[test]
    fn test_enhanced_notes_imply_enhanced() {
        let mut document = v0_document();
        document.enhanced_notes = Some([("s-1".to_string(), enhanced("s-1"))].into());

        let migrated = SessionV0ToV1Migration.migrate(document);
        assert_eq!(migrated.phase, Some(SessionPhase::Enhanced));
        assert_eq!(migrated.enhanced_notes.unwrap().len(), 1);
    }

    #[test]
    fn test_transcripts_imply_ready_to_enhance() {
        let mut document = v0_document();
        document.transcripts.insert("s-1".to_string(), vec![segment("s-1")]);

        let migrated = SessionV0ToV1Migration.migrate(document);
        assert_eq!(migrated.phase, Some(SessionPhase::ReadyToEnhance));
    }

    #[test]
    fn test_present_values_are_kept() {
        let mut document = v0_document();
        document.is_recording = true;
        document.phase = Some(SessionPhase::Enhancing);
        document.total_recording_duration = Some(42);

        let migrated = SessionV0ToV1Migration.migrate(document);
        assert_eq!(migrated.phase, Some(SessionPhase::Enhancing));
        assert_eq!(migrated.total_recording_duration, Some(42));
    }
}
